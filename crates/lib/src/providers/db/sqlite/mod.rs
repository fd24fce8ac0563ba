use crate::{
    errors::ExtractError,
    providers::db::storage::RecordStore,
    types::{ExtractionRecord, ProcessingStatus},
};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{Database, Value as TursoValue};
use uuid::Uuid;

pub mod sql;

/// A record store backed by a local SQLite database using Turso.
///
/// This provider holds a `Database` instance. When cloned, it shares the same
/// underlying database, so an in-memory store can be handed to several owners
/// (e.g. a handler and a test) and observed from both.
#[derive(Clone)]
pub struct SqliteRecordStore {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteRecordStore {
    /// Creates a new `SqliteRecordStore` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for an
    ///   isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, ExtractError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| ExtractError::StorageConnection(e.to_string()))?;

        // WAL has no effect on in-memory databases but is safe to request.
        let conn = db
            .connect()
            .map_err(|e| ExtractError::StorageConnection(e.to_string()))?;
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| ExtractError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Ensures the records table exists. Idempotent; safe on every startup.
    pub async fn initialize_schema(&self, table: &str) -> Result<(), ExtractError> {
        sql::validate_table_name(table)?;
        let conn = self
            .db
            .connect()
            .map_err(|e| ExtractError::StorageConnection(e.to_string()))?;
        conn.execute(&sql::create_records_table(table), ())
            .await
            .map_err(|e| ExtractError::StorageOperationFailed(e.to_string()))?;
        info!(table = %table, "Records table is ready.");
        Ok(())
    }

    /// Lists every record in `table`, oldest first.
    pub async fn list_records(&self, table: &str) -> Result<Vec<ExtractionRecord>, ExtractError> {
        sql::validate_table_name(table)?;
        let conn = self
            .db
            .connect()
            .map_err(|e| ExtractError::StorageConnection(e.to_string()))?;
        let mut rows = conn.query(&sql::select_records(table), ()).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let image_id = text_column(row.get_value(0)?).unwrap_or_default();
            let status = text_column(row.get_value(4)?).unwrap_or_default();
            let specifications = match text_column(row.get_value(5)?) {
                Some(json) => Some(serde_json::from_str(&json)?),
                None => None,
            };

            records.push(ExtractionRecord {
                image_id: Uuid::parse_str(&image_id).map_err(|e| {
                    ExtractError::StorageOperationFailed(format!(
                        "stored image_id '{image_id}' is not a UUID: {e}"
                    ))
                })?,
                processing_timestamp: text_column(row.get_value(1)?).unwrap_or_default(),
                source_bucket: text_column(row.get_value(2)?).unwrap_or_default(),
                source_key: text_column(row.get_value(3)?).unwrap_or_default(),
                processing_status: parse_status(&status)?,
                product_specifications: specifications,
                error_message: text_column(row.get_value(6)?),
            });
        }
        Ok(records)
    }
}

fn text_column(value: TursoValue) -> Option<String> {
    match value {
        TursoValue::Text(s) => Some(s),
        _ => None,
    }
}

fn optional_text(value: Option<String>) -> TursoValue {
    value.map_or(TursoValue::Null, TursoValue::Text)
}

fn parse_status(status: &str) -> Result<ProcessingStatus, ExtractError> {
    match status {
        "completed" => Ok(ProcessingStatus::Completed),
        "failed" => Ok(ProcessingStatus::Failed),
        other => Err(ExtractError::StorageOperationFailed(format!(
            "unknown processing_status '{other}'"
        ))),
    }
}

impl Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteRecordStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn put(&self, table: &str, record: &ExtractionRecord) -> Result<(), ExtractError> {
        sql::validate_table_name(table)?;
        let specifications = record
            .product_specifications
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self
            .db
            .connect()
            .map_err(|e| ExtractError::StorageConnection(e.to_string()))?;
        let params: Vec<TursoValue> = vec![
            record.image_id.to_string().into(),
            record.processing_timestamp.clone().into(),
            record.source_bucket.clone().into(),
            record.source_key.clone().into(),
            record.processing_status.as_str().to_string().into(),
            optional_text(specifications),
            optional_text(record.error_message.clone()),
        ];
        conn.execute(&sql::upsert_record(table), params)
            .await
            .map_err(|e| ExtractError::StorageOperationFailed(e.to_string()))?;

        debug!(table = %table, image_id = %record.image_id, "Stored extraction record");
        Ok(())
    }
}
