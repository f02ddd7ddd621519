pub mod answers;
pub mod catalogue;

pub use answers::AnswerSheet;
pub use catalogue::{Catalogue, ExportFormat, ExportSettings, Messages, QuestionConfig};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

/// 命令列參數：以答案檔取代互動式表單
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "compat-check")]
#[command(about = "Fill in, review and export the partner compatibility questionnaire")]
pub struct CliConfig {
    #[arg(long, help = "TOML file with the answers to submit")]
    pub answers: Option<String>,

    #[arg(long, help = "Question catalogue (defaults to the built-in one)")]
    pub catalogue: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_enum, help = "Spreadsheet format (defaults to the catalogue setting)")]
    pub format: Option<ExportFormat>,

    #[arg(long, help = "Only show the stored results, do not submit")]
    pub results_only: bool,

    #[arg(long, help = "Skip the export step")]
    pub no_export: bool,

    #[arg(long, help = "Keep the session directory after the run")]
    pub keep_session: bool,

    #[arg(long, help = "Do not print the results view")]
    pub quiet: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;
        if let Some(answers) = &self.answers {
            validate_path("answers", answers)?;
        }
        if let Some(catalogue) = &self.catalogue {
            validate_path("catalogue", catalogue)?;
        }
        Ok(())
    }
}
