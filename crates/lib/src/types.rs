//! # Core Types
//!
//! Events consumed by the handler, records it persists, and the status it
//! reports back to the caller.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Sentinel recorded for a container or key that was never established.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// One notification for a newly arrived object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingEvent {
    /// The bucket (or equivalent) holding the object.
    pub container: String,
    /// The object key within the container.
    pub key: String,
}

impl ProcessingEvent {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ProcessingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// The outcome of processing one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The durable record written once per processing attempt.
///
/// A completed record carries `product_specifications`; a failed one carries
/// `error_message`. Records are written once and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub image_id: Uuid,
    /// UTC, RFC 3339 with microseconds (e.g. `2025-10-02T19:55:39.589000Z`).
    pub processing_timestamp: String,
    pub source_bucket: String,
    pub source_key: String,
    pub processing_status: ProcessingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_specifications: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ExtractionRecord {
    /// Creates a `completed` record with a fresh identifier and timestamp.
    pub fn completed(event: &ProcessingEvent, specifications: Value) -> Self {
        Self {
            image_id: Uuid::new_v4(),
            processing_timestamp: now_timestamp(),
            source_bucket: event.container.clone(),
            source_key: event.key.clone(),
            processing_status: ProcessingStatus::Completed,
            product_specifications: Some(specifications),
            error_message: None,
        }
    }

    /// Creates a `failed` record with a fresh identifier and timestamp.
    pub fn failed(container: &str, key: &str, error_message: impl Into<String>) -> Self {
        Self {
            image_id: Uuid::new_v4(),
            processing_timestamp: now_timestamp(),
            source_bucket: container.to_string(),
            source_key: key.to_string(),
            processing_status: ProcessingStatus::Failed,
            product_specifications: None,
            error_message: Some(error_message.into()),
        }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The batch-level result returned to whatever triggered the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl BatchResponse {
    pub const SUCCESS_BODY: &'static str = "Processing completed successfully";

    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: Self::SUCCESS_BODY.to_string(),
        }
    }

    pub fn failure(message: impl fmt::Display) -> Self {
        Self {
            status_code: 500,
            body: format!("Error: {message}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
