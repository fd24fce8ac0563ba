use crate::{errors::ExtractError, types::ExtractionRecord};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for persisting extraction records.
///
/// This trait defines the single write path of the pipeline: a keyed upsert of
/// one record into a named table. The handler never reads records back.
#[async_trait]
pub trait RecordStore: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Writes `record` into `table`, keyed by its `image_id`.
    async fn put(&self, table: &str, record: &ExtractionRecord) -> Result<(), ExtractError>;
}

dyn_clone::clone_trait_object!(RecordStore);
