use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::registration::ValidationError;
use crate::registration::pipeline::PipelineError;
use crate::registration::validate::MethodNotAllowed;

#[derive(Debug)]
pub enum IntakeError {
    MethodNotAllowed,
    Validation(ValidationError),
    Internal(String),
}

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            IntakeError::Validation(err) => write!(f, "Validation Error: {err}"),
            IntakeError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            IntakeError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method Not Allowed" }),
            ),
            IntakeError::Validation(ValidationError::MissingFields(fields)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing required fields", "missingFields": fields }),
            ),
            IntakeError::Validation(ValidationError::InvalidEmail) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid email format" }),
            ),
            IntakeError::Internal(details) => {
                tracing::error!("Internal error: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error", "details": details }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<MethodNotAllowed> for IntakeError {
    fn from(_: MethodNotAllowed) -> Self {
        IntakeError::MethodNotAllowed
    }
}

impl From<PipelineError> for IntakeError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(err) => IntakeError::Validation(err),
            PipelineError::NullPayload
            | PipelineError::Persist(_)
            | PipelineError::Notify { .. } => {
                IntakeError::Internal(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        IntakeError::Internal(err.to_string())
    }
}
