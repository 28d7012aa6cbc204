use std::fmt;

use serde_json::Value;

use crate::config::NotifyFailurePolicy;
use crate::email::NotifyError;
use crate::state::AppState;
use crate::store::StoreError;

use super::record::{DocumentId, NewRecord, Receipt, RegistrationRecord};
use super::validate::{self, ValidationError};

#[derive(Debug)]
pub enum PipelineError {
    /// The body was literally `null`, so there is no field to read.
    NullPayload,
    Validation(ValidationError),
    /// Nothing was saved.
    Persist(StoreError),
    /// The record was saved under `document_id`, but staff were not told.
    Notify {
        document_id: DocumentId,
        source: NotifyError,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::NullPayload => {
                write!(f, "Cannot read properties of null (reading 'parentName')")
            }
            PipelineError::Validation(err) => write!(f, "{err}"),
            PipelineError::Persist(err) => write!(f, "{err}"),
            PipelineError::Notify { source, .. } => write!(f, "{source}"),
        }
    }
}

/// Validate, persist, then notify. Each stage finishes before the next starts.
pub async fn run(
    state: &AppState,
    raw: &Value,
    client_ip: Option<String>,
) -> Result<Receipt, PipelineError> {
    if raw.is_null() {
        return Err(PipelineError::NullPayload);
    }

    let registration = validate::validate(raw).map_err(PipelineError::Validation)?;
    let record = NewRecord::new(registration, client_ip);

    let receipt = state
        .store
        .add(&record)
        .await
        .map_err(PipelineError::Persist)?;

    tracing::info!(
        document_id = %receipt.document_id,
        store = state.store.name(),
        "Registration stored"
    );

    let Some(notifier) = &state.notifier else {
        return Ok(receipt);
    };

    let stored = RegistrationRecord::new(record, receipt.timestamp);
    if let Err(e) = notifier.notify(&stored, &receipt).await {
        match state.config.notify_failure_policy {
            NotifyFailurePolicy::Fatal => {
                tracing::error!(
                    document_id = %receipt.document_id,
                    "Registration saved but notification failed: {e}"
                );
                return Err(PipelineError::Notify {
                    document_id: receipt.document_id,
                    source: e,
                });
            }
            NotifyFailurePolicy::Warn => {
                tracing::warn!(
                    document_id = %receipt.document_id,
                    "Registration saved but notification failed: {e}"
                );
            }
        }
    }

    Ok(receipt)
}
