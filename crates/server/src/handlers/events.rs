//! # Event Notification Handler
//!
//! Receives bucket notifications (the `{"Records": [...]}` document emitted by
//! S3-compatible stores) and runs them through the extraction handler. The
//! HTTP status mirrors the batch `statusCode`.

use super::AppState;
use axum::{extract::State, http::StatusCode, Json};
use prodspec::BatchResponse;
use serde_json::Value;
use tracing::info;

/// The handler for the `/events` endpoint.
pub async fn events_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<BatchResponse>) {
    let record_count = payload
        .get("Records")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    info!("Received event notification with {record_count} record(s).");

    let response = app_state.handler.handle_notification(&payload).await;
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}
