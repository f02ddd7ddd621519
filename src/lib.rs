pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    AnyEncoder, CsvEncoder, FileSessionStore, LocalDownloads, MemorySessionStore, XlsxEncoder,
};
pub use config::{AnswerSheet, Catalogue, ExportFormat};
pub use core::{CompatibilityForm, FormModel, ResultExporter, ResultsPage, ResultsState, ResultsView};
pub use domain::model::{Answer, AnswerKind, FormState, PairSlot, ResultRecord, Submission};
pub use domain::view::{DisplayView, ExportFile, Notification};
pub use utils::error::{CheckError, Result};
