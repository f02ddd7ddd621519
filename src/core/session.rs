use crate::config::catalogue::Catalogue;
use crate::core::form::{progress, FormModel};
use crate::domain::model::{FormState, Schema, Submission};
use crate::domain::ports::SessionStore;
use crate::domain::view::Notification;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 固定的 session key，每次送出都會覆蓋
pub const SESSION_KEY: &str = "formData";

#[derive(Serialize)]
struct StoredSubmission<'a> {
    submitted_at: DateTime<Utc>,
    answers: &'a FormState,
}

#[derive(Deserialize)]
struct RawSubmission {
    submitted_at: DateTime<Utc>,
    answers: serde_json::Value,
}

/// Consumes the form, stores the snapshot and returns the thank-you notice.
///
/// Missing required answers are reported in the log but never block the
/// submission.
pub fn submit<S: SessionStore>(
    model: FormModel,
    store: &mut S,
    catalogue: &Catalogue,
) -> Result<(Submission, Notification)> {
    let submission = Submission {
        submitted_at: Utc::now(),
        state: model.submit(),
    };

    let report = progress(catalogue, &submission.state);
    if !report.is_complete() {
        tracing::warn!(
            "⚠️ Submitting with {} required answers missing: {}",
            report.missing_required.len(),
            report.missing_required.join(", ")
        );
    }

    save_submission(store, &submission)?;

    let messages = &catalogue.messages;
    let notification = Notification::success(
        messages.submitted_title.clone(),
        messages.submitted_description.clone(),
    );
    Ok((submission, notification))
}

pub fn save_submission<S: SessionStore>(store: &mut S, submission: &Submission) -> Result<()> {
    let payload = serde_json::to_string(&StoredSubmission {
        submitted_at: submission.submitted_at,
        answers: &submission.state,
    })?;

    store.put(SESSION_KEY, payload)?;
    tracing::info!(
        "💾 Stored submission from {} ({} answered)",
        submission.submitted_at,
        submission.state.answered()
    );
    Ok(())
}

/// Reads the stored snapshot back; `None` when nothing was submitted in
/// this session.
pub fn load_submission<S: SessionStore>(store: &S, schema: &Schema) -> Result<Option<Submission>> {
    let Some(payload) = store.get(SESSION_KEY)? else {
        tracing::debug!("No submission stored under '{}'", SESSION_KEY);
        return Ok(None);
    };

    let raw: RawSubmission = serde_json::from_str(&payload)?;
    let state = schema.decode_state(raw.answers)?;
    Ok(Some(Submission {
        submitted_at: raw.submitted_at,
        state,
    }))
}

pub fn clear<S: SessionStore>(store: &mut S) -> Result<()> {
    store.remove(SESSION_KEY)
}
