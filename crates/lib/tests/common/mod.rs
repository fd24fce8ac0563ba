#![allow(dead_code)]
//! # Common Test Utilities
//!
//! In-memory stand-ins for the three collaborators, so that handler logic can
//! be tested without a network or a database.

use async_trait::async_trait;
use dotenvy::dotenv;
use prodspec::providers::{
    ai::{messages::ResponseBlock, InferenceClient, MessagesRequest, MessagesResponse},
    db::RecordStore,
    object::ObjectStore,
};
use prodspec::{ExtractError, ExtractionRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();
    });
}

// --- Mock Object Store ---

#[derive(Clone, Debug, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, container: &str, key: &str, bytes: &[u8]) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert((container.to_string(), key.to_string()), bytes.to_vec());
        self
    }

    pub fn requested(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, ExtractError> {
        self.requests
            .lock()
            .unwrap()
            .push((container.to_string(), key.to_string()));
        self.objects
            .lock()
            .unwrap()
            .get(&(container.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| ExtractError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            })
    }
}

// --- Mock Inference Client ---

/// Answers each call with the next programmed text, in order.
#[derive(Clone, Debug, Default)]
pub struct MockInferenceClient {
    responses: Arc<Mutex<VecDeque<Result<MessagesResponse, String>>>>,
    pub calls: Arc<Mutex<Vec<(String, MessagesRequest)>>>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response whose single content block is `text`.
    pub fn reply(self, text: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(MessagesResponse {
                content: vec![ResponseBlock::Text {
                    text: text.to_string(),
                }],
            }));
        self
    }

    /// Queues a response with no content blocks.
    pub fn reply_empty(self) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(MessagesResponse { content: vec![] }));
        self
    }

    /// Queues a provider-side error.
    pub fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn get_calls(&self) -> Vec<(String, MessagesRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn complete(
        &self,
        model_id: &str,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, ExtractError> {
        self.calls
            .lock()
            .unwrap()
            .push((model_id.to_string(), request.clone()));

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ExtractError::AiApi(message)),
            None => Err(ExtractError::AiApi(
                "MockInferenceClient: no response programmed".to_string(),
            )),
        }
    }
}

// --- Mock Record Store ---

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Accept,
    RejectAll,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryRecordStore {
    records: Arc<Mutex<Vec<(String, ExtractionRecord)>>>,
    mode: Arc<Mutex<WriteMode>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        let store = Self::default();
        *store.mode.lock().unwrap() = WriteMode::RejectAll;
        store
    }

    pub fn records(&self) -> Vec<ExtractionRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub fn tables(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(table, _)| table.clone())
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn put(&self, table: &str, record: &ExtractionRecord) -> Result<(), ExtractError> {
        if *self.mode.lock().unwrap() == WriteMode::RejectAll {
            return Err(ExtractError::StorageOperationFailed(
                "MemoryRecordStore: writes are rejected".to_string(),
            ));
        }
        self.records
            .lock()
            .unwrap()
            .push((table.to_string(), record.clone()));
        Ok(())
    }
}
