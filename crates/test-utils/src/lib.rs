use anyhow::Result;
use prodspec::providers::db::sqlite::SqliteRecordStore;
use prodspec::ExtractionRecord;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// --- Test Setup ---

/// A scratch area for one test: a temporary SQLite record database and an
/// object root directory, both removed when the setup is dropped.
pub struct TestSetup {
    pub record_store: SqliteRecordStore,
    pub db_path: PathBuf,
    pub table: String,
    dir: TempDir,
}

impl TestSetup {
    /// Creates the temporary directory, opens the database and creates `table`.
    pub async fn new(table: &str) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("records.db");
        let record_store = SqliteRecordStore::new(&db_path.to_string_lossy()).await?;
        record_store.initialize_schema(table).await?;
        std::fs::create_dir_all(dir.path().join("objects"))?;

        Ok(Self {
            record_store,
            db_path,
            table: table.to_string(),
            dir,
        })
    }

    /// Root directory for a `LocalObjectStore`.
    pub fn objects_root(&self) -> PathBuf {
        self.dir.path().join("objects")
    }

    /// Writes an object under `objects_root()/container/key`.
    pub fn put_object(&self, container: &str, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.objects_root().join(container).join(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Every record written to the test table so far.
    pub async fn records(&self) -> Result<Vec<ExtractionRecord>> {
        Ok(self.record_store.list_records(&self.table).await?)
    }
}

// --- Response and Event Builders ---

/// A Messages-format response body whose single content block is `text`.
pub fn messages_text_response(text: &str) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    })
}

/// A bucket notification with one record per (bucket, key) pair.
pub fn bucket_notification(entries: &[(&str, &str)]) -> Value {
    let records: Vec<Value> = entries
        .iter()
        .map(|(bucket, key)| {
            json!({
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": bucket},
                    "object": {"key": key, "size": 1024}
                }
            })
        })
        .collect();
    json!({ "Records": records })
}
