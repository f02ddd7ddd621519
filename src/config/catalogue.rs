use crate::domain::model::{AnswerKind, FieldSpec, PairSlot, Schema};
use crate::utils::error::{CheckError, Result};
use crate::utils::validation::{
    validate_bounds, validate_non_empty_string, validate_sheet_name, validate_unique, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 內建問卷：未傳入 --catalogue 時使用
const BUILTIN_CATALOGUE: &str = include_str!("../../assets/compatibility_check.toml");

const DEFAULT_RATING_MIN: i64 = 1;
const DEFAULT_RATING_MAX: i64 = 10;

/// Static question configuration: kinds, labels, bounds, grouping and
/// export naming. The core reads it but never computes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogue {
    pub title: String,
    #[serde(default = "default_fallback")]
    pub fallback: String,
    pub sections: Vec<String>,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub messages: Messages,
    pub fields: Vec<QuestionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub name: String,
    pub kind: AnswerKind,
    pub section: String,
    pub title: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multiline: bool,
    #[serde(default)]
    pub options: Vec<OptionConfig>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub leisure_title: Option<String>,
    pub work_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionConfig {
    pub tag: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub sheet_name: String,
    pub file_prefix: String,
    pub file_fallback: String,
    /// 檔名取自這個欄位的答案
    pub file_name_field: Option<String>,
    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sheet_name: "Results".to_string(),
            file_prefix: "Compatibility-Check".to_string(),
            file_fallback: "Results".to_string(),
            file_name_field: None,
            format: ExportFormat::Xlsx,
        }
    }
}

/// 提示訊息文字
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub submitted_title: String,
    pub submitted_description: String,
    pub export_success_title: String,
    pub export_success_description: String,
    pub export_failure_title: String,
    pub export_failure_description: String,
    pub nothing_to_export: String,
    pub no_data_title: String,
    pub no_data_message: String,
    pub no_data_action: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            submitted_title: "Form submitted".to_string(),
            submitted_description: "Thank you for completing the questionnaire!".to_string(),
            export_success_title: "Spreadsheet created".to_string(),
            export_success_description: "The results were exported successfully.".to_string(),
            export_failure_title: "Export failed".to_string(),
            export_failure_description: "The spreadsheet file could not be created.".to_string(),
            nothing_to_export: "There are no submitted answers to export.".to_string(),
            no_data_title: "No data found".to_string(),
            no_data_message: "No form data was found. Please fill in the questionnaire first."
                .to_string(),
            no_data_action: "Go to the form".to_string(),
        }
    }
}

fn default_fallback() -> String {
    "Not provided".to_string()
}

impl QuestionConfig {
    /// 選項代碼對應的顯示文字
    pub fn label_for(&self, tag: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.tag == tag)
            .map(|option| option.label.as_str())
    }

    pub fn bounds(&self) -> (i64, i64) {
        (
            self.min.unwrap_or(DEFAULT_RATING_MIN),
            self.max.unwrap_or(DEFAULT_RATING_MAX),
        )
    }

    pub fn slot_title(&self, slot: PairSlot) -> String {
        let configured = match slot {
            PairSlot::Leisure => self.leisure_title.as_ref(),
            PairSlot::Work => self.work_title.as_ref(),
        };
        configured
            .cloned()
            .unwrap_or_else(|| format!("{} ({})", self.title, slot.as_str()))
    }

    /// Spreadsheet columns this question flattens into.
    pub fn column_names(&self) -> Vec<String> {
        match self.kind {
            AnswerKind::RatingPair => PairSlot::ALL
                .iter()
                .map(|slot| format!("{}_{}", self.name, slot.as_str()))
                .collect(),
            _ => vec![self.name.clone()],
        }
    }
}

impl Catalogue {
    /// 從 TOML 檔案載入問卷設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CheckError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析問卷設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalogue: Catalogue = toml::from_str(content)?;
        tracing::debug!(
            "Loaded catalogue '{}' with {} fields",
            catalogue.title,
            catalogue.fields.len()
        );
        Ok(catalogue)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOGUE)
    }

    pub fn schema(&self) -> Schema {
        Schema::new(
            self.fields
                .iter()
                .map(|question| FieldSpec::new(question.name.clone(), question.kind))
                .collect(),
        )
    }

    pub fn question(&self, name: &str) -> Option<&QuestionConfig> {
        self.fields.iter().find(|question| question.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &QuestionConfig> {
        self.fields.iter().filter(|question| question.required)
    }

    /// 驗證設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)?;
        validate_non_empty_string("fallback", &self.fallback)?;

        if self.fields.is_empty() {
            return Err(CheckError::ConfigError {
                message: "catalogue defines no fields".to_string(),
            });
        }

        validate_unique("sections", self.sections.iter().map(String::as_str))?;
        validate_unique("fields.name", self.fields.iter().map(|q| q.name.as_str()))?;

        // 巢狀評分會展開成 <field>_<slot>，不可與其他欄位撞名
        let columns: Vec<String> = self.fields.iter().flat_map(|q| q.column_names()).collect();
        validate_unique("fields.columns", columns.iter().map(String::as_str))?;

        for question in &self.fields {
            let prefix = format!("fields.{}", question.name);
            validate_non_empty_string("fields.name", &question.name)?;
            validate_non_empty_string(&format!("{}.title", prefix), &question.title)?;

            if !self.sections.contains(&question.section) {
                return Err(CheckError::InvalidConfigValueError {
                    field: format!("{}.section", prefix),
                    value: question.section.clone(),
                    reason: "Section is not listed in 'sections'".to_string(),
                });
            }

            validate_unique(
                &format!("{}.options", prefix),
                question.options.iter().map(|o| o.tag.as_str()),
            )?;

            match question.kind {
                AnswerKind::Choice if question.options.is_empty() => {
                    return Err(CheckError::InvalidConfigValueError {
                        field: format!("{}.options", prefix),
                        value: String::new(),
                        reason: "Choice questions need at least one option".to_string(),
                    });
                }
                AnswerKind::Rating | AnswerKind::RatingPair => {
                    let (min, max) = question.bounds();
                    validate_bounds(&prefix, min, max)?;
                }
                _ => {}
            }
        }

        validate_sheet_name("export.sheet_name", &self.export.sheet_name)?;
        validate_non_empty_string("export.file_prefix", &self.export.file_prefix)?;
        validate_non_empty_string("export.file_fallback", &self.export.file_fallback)?;
        if let Some(field) = &self.export.file_name_field {
            match self.question(field) {
                Some(question) if question.kind.is_scalar() => {}
                _ => {
                    return Err(CheckError::InvalidConfigValueError {
                        field: "export.file_name_field".to_string(),
                        value: field.clone(),
                        reason: "Must name a text or choice field".to_string(),
                    })
                }
            }
        }

        Ok(())
    }
}

impl Validate for Catalogue {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
