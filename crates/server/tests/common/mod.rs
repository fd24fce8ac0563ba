//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port. Source objects live in
//! a temporary local object store, records in a temporary SQLite database,
//! and the inference endpoint is an `httpmock::MockServer`.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::{Method::POST, Mock, MockServer};
use prodspec::ExtractionRecord;
use prodspec_server::{config, router, state::assemble_app_state};
use prodspec_test_utils::{messages_text_response, TestSetup};
use reqwest::Client;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};
use tokio::{net::TcpListener, task::JoinHandle};

pub const TEST_TABLE: &str = "product-specifications";
pub const TEST_MODEL: &str = "test-vision-model";
pub const TEST_API_KEY: &str = "test-api-key";
pub const MESSAGES_PATH: &str = "/v1/messages";

pub fn setup_tracing() {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init();
}

/// Writes a `config.yml` into `setup`'s directory that points the local object
/// store, the record database at `db_path` and the inference endpoint at test
/// resources.
pub fn write_test_config(setup: &TestSetup, db_path: &Path, inference_url: &str) -> Result<PathBuf> {
    let config_path = setup.path().join("config.yml");
    let content = format!(
        r#"
port: 0
db_url: "{db_url}"
extraction:
  model_id: "{TEST_MODEL}"
  table_name: "{TEST_TABLE}"
inference:
  api_url: "{inference_url}"
  api_key: "{TEST_API_KEY}"
object_store:
  kind: local
  root: "{root}"
"#,
        db_url = db_path.display(),
        root = setup.objects_root().display(),
    );
    std::fs::write(&config_path, content)?;
    Ok(config_path)
}

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub setup: TestSetup,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        setup_tracing();

        let mock_server = MockServer::start_async().await;
        let setup = TestSetup::new(TEST_TABLE).await?;
        let config_path = write_test_config(&setup, &setup.db_path, &mock_server.url(MESSAGES_PATH))?;
        let config = config::get_config(Some(&config_path.to_string_lossy()))?;

        // The handler shares the setup's database so tests can read what it wrote.
        let app_state = assemble_app_state(config, setup.record_store.clone())?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            setup,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Mocks the inference endpoint to answer every request with `text`.
    pub async fn mock_model_answer(&self, text: &str) -> Mock<'_> {
        let body = messages_text_response(text);
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(MESSAGES_PATH)
                    .header("x-api-key", TEST_API_KEY);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(body);
            })
            .await
    }

    /// Posts a notification document to `/events`.
    pub async fn post_events(&self, payload: &serde_json::Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/events", self.address))
            .json(payload)
            .send()
            .await?)
    }

    pub async fn records(&self) -> Result<Vec<ExtractionRecord>> {
        self.setup.records().await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
