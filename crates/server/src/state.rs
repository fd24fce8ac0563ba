//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The collaborators of the extraction handler are
//! created here exactly once and reused by every invocation.

use crate::config::{non_empty, AppConfig, ObjectStoreKind};
use prodspec::{
    providers::{
        ai::anthropic::AnthropicProvider,
        db::sqlite::SqliteRecordStore,
        object::{http::HttpObjectStore, local::LocalObjectStore, ObjectStore},
    },
    ExtractionHandler,
};
use std::{path::Path, sync::Arc};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The extraction handler with its pre-built collaborators.
    pub handler: Arc<ExtractionHandler>,
}

/// Builds the object store selected by `object_store.kind`.
fn build_object_store(config: &AppConfig) -> anyhow::Result<Box<dyn ObjectStore>> {
    let store_config = &config.object_store;
    let store: Box<dyn ObjectStore> = match store_config.kind {
        ObjectStoreKind::Http => {
            let base_url = non_empty(&store_config.base_url).ok_or_else(|| {
                anyhow::anyhow!("object_store.base_url is required for the http object store")
            })?;
            info!(base_url = %base_url, "Using HTTP object store.");
            Box::new(HttpObjectStore::new(
                base_url,
                non_empty(&store_config.bearer_token),
            )?)
        }
        ObjectStoreKind::Local => {
            let root = non_empty(&store_config.root).ok_or_else(|| {
                anyhow::anyhow!("object_store.root is required for the local object store")
            })?;
            info!(root = %root, "Using local object store.");
            Box::new(LocalObjectStore::new(root))
        }
    };
    Ok(store)
}

/// Opens the record database, creating its parent directory and the records
/// table when missing.
pub async fn build_record_store(config: &AppConfig) -> anyhow::Result<SqliteRecordStore> {
    if config.db_url != ":memory:" {
        if let Some(parent) = Path::new(&config.db_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    let record_store = SqliteRecordStore::new(&config.db_url).await?;
    record_store
        .initialize_schema(&config.extraction.table_name)
        .await?;
    info!(db_path = %config.db_url, "Initialized record store (SQLite).");
    Ok(record_store)
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let record_store = build_record_store(&config).await?;
    assemble_app_state(config, record_store)
}

/// Wires the object store, inference client and an already opened record
/// store into an `AppState`.
pub fn assemble_app_state(
    config: AppConfig,
    record_store: SqliteRecordStore,
) -> anyhow::Result<AppState> {
    let object_store = build_object_store(&config)?;
    let inference = AnthropicProvider::new(
        config.inference.api_url.clone(),
        non_empty(&config.inference.api_key),
    )?;

    let handler = ExtractionHandler::builder()
        .object_store(object_store)
        .inference_client(Box::new(inference))
        .record_store(Box::new(record_store))
        .config(config.extraction.clone())
        .build()?;
    info!(model_id = %config.extraction.model_id, table = %config.extraction.table_name, "Extraction handler ready.");

    Ok(AppState {
        handler: Arc::new(handler),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InferenceConfig, ObjectStoreConfig};
    use prodspec::HandlerConfig;

    fn local_config() -> AppConfig {
        AppConfig {
            port: 0,
            db_url: ":memory:".to_string(),
            extraction: HandlerConfig {
                model_id: "state-test-model".to_string(),
                table_name: "state-test".to_string(),
                ..HandlerConfig::default()
            },
            inference: InferenceConfig {
                api_url: "http://127.0.0.1:1/v1/messages".to_string(),
                api_key: None,
            },
            object_store: ObjectStoreConfig {
                kind: ObjectStoreKind::Local,
                base_url: None,
                bearer_token: None,
                root: Some("objects".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn handler_carries_the_extraction_config() {
        let state = build_app_state(local_config()).await.unwrap();
        assert_eq!(state.handler.config().model_id, "state-test-model");
        assert_eq!(state.handler.config().table_name, "state-test");
    }

    #[tokio::test]
    async fn http_store_without_base_url_is_rejected() {
        let mut config = local_config();
        config.object_store.kind = ObjectStoreKind::Http;
        let error = build_app_state(config).await.err().unwrap();
        assert!(error.to_string().contains("object_store.base_url"));
    }
}
