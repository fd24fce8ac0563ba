//! # Product Specification Extraction
//!
//! This crate turns newly uploaded product images into structured records. For
//! every object notification it fetches the image from an object store, asks a
//! multimodal model to describe the product as JSON, recovers the JSON from the
//! model's free-text answer and writes exactly one record (completed or
//! failed) to a record store.
//!
//! The three collaborators are traits (`ObjectStore`, `InferenceClient`,
//! `RecordStore`) injected into an `ExtractionHandler` at construction time.

pub mod constants;
pub mod errors;
pub mod extractor;
pub mod handler;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::ExtractError;
pub use extractor::{extract_payload, parse_specifications};
pub use handler::{ExtractionHandler, ExtractionHandlerBuilder, HandlerConfig};
pub use types::{BatchResponse, ExtractionRecord, ProcessingEvent, ProcessingStatus};
