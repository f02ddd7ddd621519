use crate::config::catalogue::Catalogue;
use crate::core::exporter::ResultExporter;
use crate::core::session::load_submission;
use crate::domain::model::Submission;
use crate::domain::ports::{DownloadSink, SessionStore, SpreadsheetEncoder};
use crate::domain::view::{DisplayView, Notification};

/// Lifecycle of the results page. Having no submission is a normal state,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsState {
    Loading,
    HasData(Submission),
    NoData,
}

/// What a presenter should draw right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    Loading,
    Empty {
        title: String,
        message: String,
        call_to_action: String,
    },
    Results(DisplayView),
}

#[derive(Debug)]
pub struct ResultsPage<'a> {
    catalogue: &'a Catalogue,
    state: ResultsState,
}

impl<'a> ResultsPage<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self {
            catalogue,
            state: ResultsState::Loading,
        }
    }

    pub fn state(&self) -> &ResultsState {
        &self.state
    }

    /// 讀取 session 中的快照；讀不到或解不開都視為沒有資料
    pub fn mount<S: SessionStore>(&mut self, store: &S) -> &ResultsState {
        self.state = match load_submission(store, &self.catalogue.schema()) {
            Ok(Some(submission)) => {
                tracing::info!(
                    "Loaded submission with {} answers",
                    submission.state.answered()
                );
                ResultsState::HasData(submission)
            }
            Ok(None) => ResultsState::NoData,
            Err(e) => {
                tracing::warn!("⚠️ Stored submission is unusable, showing empty page: {}", e);
                ResultsState::NoData
            }
        };
        &self.state
    }

    pub fn view<E: SpreadsheetEncoder>(&self, exporter: &ResultExporter<'_, E>) -> ResultsView {
        match &self.state {
            ResultsState::Loading => ResultsView::Loading,
            ResultsState::NoData => {
                let messages = &self.catalogue.messages;
                ResultsView::Empty {
                    title: messages.no_data_title.clone(),
                    message: messages.no_data_message.clone(),
                    call_to_action: messages.no_data_action.clone(),
                }
            }
            ResultsState::HasData(submission) => ResultsView::Results(
                exporter.to_display_view(&submission.state, Some(submission.submitted_at)),
            ),
        }
    }

    /// Encodes the stored answers and offers the file. Failures become a
    /// failure notification; the stored answers stay as they are either way.
    pub fn export<E: SpreadsheetEncoder, D: DownloadSink>(
        &self,
        exporter: &ResultExporter<'_, E>,
        sink: &mut D,
    ) -> Notification {
        let messages = &self.catalogue.messages;

        let ResultsState::HasData(submission) = &self.state else {
            tracing::warn!("Export requested without submitted answers");
            return Notification::failure(
                messages.export_failure_title.clone(),
                messages.nothing_to_export.clone(),
            );
        };

        let outcome = exporter
            .export(&submission.state)
            .and_then(|file| sink.offer(&file));

        match outcome {
            Ok(location) => {
                tracing::info!("✅ Export offered at {}", location);
                Notification::success(
                    messages.export_success_title.clone(),
                    messages.export_success_description.clone(),
                )
            }
            Err(e) => {
                tracing::error!(
                    "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                Notification::failure(
                    messages.export_failure_title.clone(),
                    messages.export_failure_description.clone(),
                )
            }
        }
    }
}
