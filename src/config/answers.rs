use crate::core::form::FormModel;
use crate::domain::model::AnswerKind;
use crate::utils::error::{CheckError, Result};
use serde::Deserialize;
use std::path::Path;
use toml::Value;

/// Answers filled in ahead of time, one TOML key per field.
///
/// ```toml
/// expectations = ["marriage", "children"]
/// pets = "maybe"
/// timeTogether = 7
/// lifeScores = { leisure = 7 }
/// name = "Anna"
/// ```
///
/// Applying a sheet drives the same operations an interactive form would.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    answers: toml::Table,
}

impl AnswerSheet {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CheckError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let sheet: AnswerSheet = toml::from_str(content)?;
        tracing::debug!("Loaded answer sheet with {} entries", sheet.answers.len());
        Ok(sheet)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// 依序套用到表單；任何一個欄位不合就整個失敗，表單維持原狀
    pub fn apply(&self, model: &mut FormModel) -> Result<()> {
        let mut staged = model.clone();
        for (field, value) in &self.answers {
            let kind = staged
                .schema()
                .field(field)
                .map(|spec| spec.kind)
                .ok_or_else(|| {
                    CheckError::schema_violation(field.as_str(), "field is not part of the catalogue")
                })?;

            apply_value(&mut staged, field, kind, value)?;
        }
        *model = staged;

        tracing::info!("Applied {} answers from sheet", self.answers.len());
        Ok(())
    }
}

fn apply_value(model: &mut FormModel, field: &str, kind: AnswerKind, value: &Value) -> Result<()> {
    match (kind, value) {
        (AnswerKind::MultiSelect, Value::Array(items)) => {
            for item in items {
                let tag = item.as_str().ok_or_else(|| {
                    CheckError::schema_violation(field, format!("expected string tags, found {}", item))
                })?;
                // 清單列出的是要選的項目，重複列出不應取消選取
                if !model.is_selected(field, tag) {
                    model.toggle_set_member(field, tag)?;
                }
            }
            Ok(())
        }
        (AnswerKind::Text | AnswerKind::Choice, Value::String(text)) => model.set_scalar(field, text),
        // age = 34 與 age = "34" 視為相同
        (AnswerKind::Text, Value::Integer(number)) => model.set_scalar(field, &number.to_string()),
        (AnswerKind::Rating, Value::Integer(rating)) => model.set_rating(field, *rating),
        (AnswerKind::RatingPair, Value::Table(slots)) => {
            for (slot, rating) in slots {
                let rating = rating.as_integer().ok_or_else(|| {
                    CheckError::schema_violation(
                        format!("{}.{}", field, slot),
                        format!("expected an integer rating, found {}", rating),
                    )
                })?;
                model.set_nested_rating(field, slot, rating)?;
            }
            Ok(())
        }
        (kind, other) => Err(CheckError::schema_violation(
            field,
            format!("a {} answer cannot be given as {}", kind, other.type_str()),
        )),
    }
}
