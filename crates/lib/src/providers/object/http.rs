//! # HTTP Object Store
//!
//! Reads objects with a plain `GET {base_url}/{container}/{key}`, the
//! path-style addressing understood by S3-compatible servers for public or
//! proxied buckets.

use crate::{errors::ExtractError, providers::object::ObjectStore};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct HttpObjectStore {
    client: ReqwestClient,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpObjectStore {
    /// Creates a new `HttpObjectStore` rooted at `base_url`.
    pub fn new(base_url: String, bearer_token: Option<String>) -> Result<Self, ExtractError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ExtractError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token,
        })
    }

    fn object_url(&self, container: &str, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            container,
            key.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, ExtractError> {
        let url = self.object_url(container, key);
        debug!(url = %url, "Fetching object");

        let mut request_builder = self.client.get(&url);
        if let Some(token) = &self.bearer_token {
            request_builder = request_builder.bearer_auth(token);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| ExtractError::ObjectFetch(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ExtractError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            }),
            status if !status.is_success() => {
                let error_text = response.text().await.unwrap_or_default();
                Err(ExtractError::ObjectFetch(format!(
                    "GET {url} returned status {status}: {error_text}"
                )))
            }
            _ => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ExtractError::ObjectFetch(e.to_string()))?;
                Ok(bytes.to_vec())
            }
        }
    }
}
