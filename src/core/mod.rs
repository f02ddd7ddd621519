pub mod exporter;
pub mod form;
pub mod results;
pub mod session;

pub use crate::domain::model::{Answer, FormState, ResultRecord, Submission};
pub use crate::domain::ports::{DownloadSink, SessionStore, SpreadsheetEncoder};
pub use crate::utils::error::Result;
pub use exporter::ResultExporter;
pub use form::{progress, CompatibilityForm, FormModel};
pub use results::{ResultsPage, ResultsState, ResultsView};
