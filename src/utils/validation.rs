use crate::utils::error::{CheckError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CheckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CheckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CheckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_bounds(field_name: &str, min: i64, max: i64) -> Result<()> {
    if min > max {
        return Err(CheckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}..={}", min, max),
            reason: "Minimum must not be greater than maximum".to_string(),
        });
    }
    Ok(())
}

/// 檢查名稱是否重複，回傳第一個重複的名稱
pub fn validate_unique<'a, I>(field_name: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(CheckError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Duplicate entry".to_string(),
            });
        }
    }
    Ok(())
}

/// 試算表工作表名稱：1 到 31 個字元，不可包含 []:*?/\
pub fn validate_sheet_name(field_name: &str, name: &str) -> Result<()> {
    const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

    let length = name.chars().count();
    if length == 0 || length > 31 {
        return Err(CheckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Sheet name must be between 1 and 31 characters".to_string(),
        });
    }

    if let Some(c) = name.chars().find(|c| FORBIDDEN.contains(c)) {
        return Err(CheckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: format!("Sheet name cannot contain '{}'", c),
        });
    }

    Ok(())
}
