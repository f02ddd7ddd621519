use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Schema violation on field '{field}': {reason}")]
    SchemaViolation { field: String, reason: String },

    #[error("Export failed: {message}")]
    ExportFailure { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Schema,
    Export,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CheckError {
    pub fn schema_violation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 將任意錯誤包裝成匯出失敗
    pub fn export_failure(err: impl std::fmt::Display) -> Self {
        Self::ExportFailure {
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SchemaViolation { .. } => ErrorCategory::Schema,
            Self::ExportFailure { .. } | Self::ZipError(_) | Self::CsvError(_) => {
                ErrorCategory::Export
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Storage,
            Self::TomlError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 匯出失敗可以重試，表單資料不受影響
            Self::ExportFailure { .. } | Self::ZipError(_) | Self::CsvError(_) => {
                ErrorSeverity::Medium
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::High,
            Self::TomlError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorSeverity::High
            }
            // 欄位不存在代表程式錯誤
            Self::SchemaViolation { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn is_export_failure(&self) -> bool {
        self.category() == ErrorCategory::Export
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::SchemaViolation { field, .. } => {
                format!("The questionnaire has no usable field named '{}'", field)
            }
            Self::ExportFailure { .. } | Self::ZipError(_) | Self::CsvError(_) => {
                "The spreadsheet file could not be created.".to_string()
            }
            Self::IoError(e) => format!("A file could not be read or written: {}", e),
            Self::SerializationError(_) => "The stored answers could not be read.".to_string(),
            Self::TomlError(e) => format!("A configuration file is not valid TOML: {}", e),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::SchemaViolation { .. } => {
                "Check that the answer sheet only uses field names defined in the catalogue"
            }
            Self::ExportFailure { .. } | Self::ZipError(_) | Self::CsvError(_) => {
                "Your answers are kept; try the export again"
            }
            Self::IoError(_) => "Check that the output directory exists and is writable",
            Self::SerializationError(_) => "Fill in the questionnaire again and resubmit",
            Self::TomlError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
