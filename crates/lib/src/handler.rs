//! # Extraction Handler
//!
//! Orchestrates one invocation: for each object notification, fetch the image,
//! ask the model to describe it, parse the answer and persist a record.
//!
//! Events are processed strictly in order. The first unrecovered failure stops
//! the batch: a `failed` record is written on a best-effort basis and the batch
//! reports status 500. A model answer that is not valid JSON is not a failure;
//! it is stored as a `completed` record with a fallback mapping.

use crate::{
    constants::{
        DEFAULT_ANTHROPIC_VERSION, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_ID, DEFAULT_TABLE_NAME,
    },
    errors::ExtractError,
    extractor::parse_specifications,
    prompts::PRODUCT_EXTRACTION_PROMPT,
    providers::{
        ai::{media_type_for_key, InferenceClient, MessagesRequest},
        db::RecordStore,
        object::ObjectStore,
    },
    types::{BatchResponse, ExtractionRecord, ProcessingEvent, UNKNOWN_SOURCE},
};
use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Values the handler needs that are fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// The inference model to invoke.
    pub model_id: String,
    /// The record store table that receives every record.
    pub table_name: String,
    /// Upper bound on the length of the model's answer.
    pub max_tokens: u32,
    /// Sent as `anthropic_version` in the body of Bedrock-style requests.
    pub anthropic_version: String,
    /// The extraction instructions sent alongside the image.
    pub prompt: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            prompt: PRODUCT_EXTRACTION_PROMPT.to_string(),
        }
    }
}

/// Processes batches of object notifications.
///
/// The collaborators are built once at startup and shared by every
/// invocation; the handler itself keeps no per-event state.
pub struct ExtractionHandler {
    object_store: Box<dyn ObjectStore>,
    inference: Box<dyn InferenceClient>,
    record_store: Box<dyn RecordStore>,
    config: HandlerConfig,
}

impl fmt::Debug for ExtractionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionHandler")
            .field("object_store", &self.object_store.name())
            .field("record_store", &self.record_store.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A failure that ended a batch, with the best-known source of the object.
struct EventFailure {
    container: String,
    key: String,
    error: ExtractError,
}

impl EventFailure {
    fn new(container: &str, key: &str, error: ExtractError) -> Self {
        Self {
            container: container.to_string(),
            key: key.to_string(),
            error,
        }
    }
}

impl ExtractionHandler {
    pub fn builder() -> ExtractionHandlerBuilder {
        ExtractionHandlerBuilder::new()
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Processes already-parsed events in order.
    pub async fn handle_batch(&self, events: &[ProcessingEvent]) -> BatchResponse {
        for event in events {
            if let Err(error) = self.process_event(event).await {
                return self
                    .fail(EventFailure::new(&event.container, &event.key, error))
                    .await;
            }
        }
        BatchResponse::success()
    }

    /// Processes a bucket notification of the form
    /// `{"Records": [{"s3": {"bucket": {"name": ..}, "object": {"key": ..}}}]}`.
    ///
    /// Records are read one at a time, so a malformed record only fails once
    /// every record before it has been processed.
    pub async fn handle_notification(&self, payload: &Value) -> BatchResponse {
        match self.process_notification(payload).await {
            Ok(()) => BatchResponse::success(),
            Err(failure) => self.fail(failure).await,
        }
    }

    async fn process_notification(&self, payload: &Value) -> Result<(), EventFailure> {
        let records = payload
            .get("Records")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                EventFailure::new(
                    UNKNOWN_SOURCE,
                    UNKNOWN_SOURCE,
                    ExtractError::MalformedEvent("missing 'Records' array".to_string()),
                )
            })?;

        for (index, record) in records.iter().enumerate() {
            let event = event_from_record(index, record)?;
            self.process_event(&event)
                .await
                .map_err(|error| EventFailure::new(&event.container, &event.key, error))?;
        }
        Ok(())
    }

    /// Runs the full pipeline for one object and returns the stored record.
    ///
    /// Any error returned here is unrecovered; a model answer that fails to
    /// parse is not an error.
    pub async fn process_event(
        &self,
        event: &ProcessingEvent,
    ) -> Result<ExtractionRecord, ExtractError> {
        info!("Processing image: {event}");

        let image = self.object_store.get(&event.container, &event.key).await?;
        let request = MessagesRequest::image_prompt(
            &self.config.anthropic_version,
            self.config.max_tokens,
            media_type_for_key(&event.key),
            BASE64_STANDARD.encode(&image),
            &self.config.prompt,
        );
        debug!(
            bytes = image.len(),
            model_id = %self.config.model_id,
            "--> Sending image to inference provider"
        );

        let response = self
            .inference
            .complete(&self.config.model_id, &request)
            .await?;
        let extracted_text = response
            .first_text()
            .ok_or(ExtractError::EmptyModelResponse)?;
        debug!("<-- Model answer: {extracted_text}");

        let specifications = parse_specifications(extracted_text);
        let record = ExtractionRecord::completed(event, specifications);
        self.record_store
            .put(&self.config.table_name, &record)
            .await?;

        info!(
            "Successfully processed image {} with ID {}",
            event.key, record.image_id
        );
        Ok(record)
    }

    /// Writes a `failed` record for `container`/`key`.
    ///
    /// Never returns an error: if the write fails it is logged and `None` is
    /// returned, leaving `error` as the failure the caller reports.
    pub async fn record_failure(
        &self,
        container: &str,
        key: &str,
        error: &ExtractError,
    ) -> Option<ExtractionRecord> {
        let record = ExtractionRecord::failed(container, key, error.to_string());
        match self
            .record_store
            .put(&self.config.table_name, &record)
            .await
        {
            Ok(()) => Some(record),
            Err(write_error) => {
                warn!("Could not store failure record for {container}/{key}: {write_error}");
                None
            }
        }
    }

    async fn fail(&self, failure: EventFailure) -> BatchResponse {
        error!("Error processing image: {}", failure.error);
        self.record_failure(&failure.container, &failure.key, &failure.error)
            .await;
        BatchResponse::failure(&failure.error)
    }
}

/// Reads the container, then the key, from one notification record.
fn event_from_record(index: usize, record: &Value) -> Result<ProcessingEvent, EventFailure> {
    let container = record
        .pointer("/s3/bucket/name")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            EventFailure::new(
                UNKNOWN_SOURCE,
                UNKNOWN_SOURCE,
                ExtractError::MalformedEvent(format!("record {index} has no s3.bucket.name")),
            )
        })?;
    let key = record
        .pointer("/s3/object/key")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            EventFailure::new(
                container,
                UNKNOWN_SOURCE,
                ExtractError::MalformedEvent(format!("record {index} has no s3.object.key")),
            )
        })?;
    Ok(ProcessingEvent::new(container, key))
}

/// A builder for creating `ExtractionHandler` instances.
#[derive(Default)]
pub struct ExtractionHandlerBuilder {
    object_store: Option<Box<dyn ObjectStore>>,
    inference: Option<Box<dyn InferenceClient>>,
    record_store: Option<Box<dyn RecordStore>>,
    config: Option<HandlerConfig>,
}

impl ExtractionHandlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_store(mut self, object_store: Box<dyn ObjectStore>) -> Self {
        self.object_store = Some(object_store);
        self
    }

    pub fn inference_client(mut self, inference: Box<dyn InferenceClient>) -> Self {
        self.inference = Some(inference);
        self
    }

    pub fn record_store(mut self, record_store: Box<dyn RecordStore>) -> Self {
        self.record_store = Some(record_store);
        self
    }

    /// Overrides the default `HandlerConfig`.
    pub fn config(mut self, config: HandlerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the `ExtractionHandler`.
    ///
    /// Fails with `ExtractError::MissingCollaborator` if any of the three
    /// collaborators was not provided.
    pub fn build(self) -> Result<ExtractionHandler, ExtractError> {
        Ok(ExtractionHandler {
            object_store: self
                .object_store
                .ok_or(ExtractError::MissingCollaborator("object store"))?,
            inference: self
                .inference
                .ok_or(ExtractError::MissingCollaborator("inference client"))?,
            record_store: self
                .record_store
                .ok_or(ExtractError::MissingCollaborator("record store"))?,
            config: self.config.unwrap_or_default(),
        })
    }
}
