use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::IntakeError;
use crate::registration::{client_ip, pipeline, validate};
use crate::state::SharedState;

/// Intake endpoint. Mounted for every method so non-POST requests get the JSON 405.
pub async fn submit(
    State(state): State<SharedState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, IntakeError> {
    validate::ensure_post(&method)?;

    let raw: serde_json::Value = serde_json::from_slice(&body)?;
    let ip = client_ip::extract(&headers, &state.config.client_ip_header);

    let receipt = pipeline::run(&state, &raw, ip).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "documentId": receipt.document_id,
        })),
    )
        .into_response())
}
