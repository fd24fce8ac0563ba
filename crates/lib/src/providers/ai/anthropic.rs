use crate::{
    errors::ExtractError,
    providers::ai::{messages::Message, InferenceClient, MessagesRequest, MessagesResponse},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use tracing::debug;

/// The placeholder in `api_url` that is replaced by the model identifier.
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// The `anthropic-version` header sent to the Messages API.
pub const MESSAGES_API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anthropic_version: Option<&'a str>,
    max_tokens: u32,
    messages: &'a [Message],
}

/// A provider for endpoints that speak the Anthropic Messages format.
///
/// If `api_url` contains `{model}` (Bedrock's `/model/{model}/invoke` style),
/// the model identifier is substituted into the URL, `anthropic_version` stays
/// in the body and the key is sent as a bearer token. Otherwise the request
/// targets the Messages API: the model goes in the body, the version in the
/// `anthropic-version` header and the key in `x-api-key`.
#[derive(Clone, Debug)]
pub struct AnthropicProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
}

impl AnthropicProvider {
    /// Creates a new `AnthropicProvider`.
    pub fn new(api_url: String, api_key: Option<String>) -> Result<Self, ExtractError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ExtractError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl InferenceClient for AnthropicProvider {
    async fn complete(
        &self,
        model_id: &str,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, ExtractError> {
        let bedrock_style = self.api_url.contains(MODEL_PLACEHOLDER);
        let (url, payload) = if bedrock_style {
            (
                self.api_url.replace(MODEL_PLACEHOLDER, model_id),
                AnthropicRequest {
                    model: None,
                    anthropic_version: Some(&request.anthropic_version),
                    max_tokens: request.max_tokens,
                    messages: &request.messages,
                },
            )
        } else {
            (
                self.api_url.clone(),
                AnthropicRequest {
                    model: Some(model_id),
                    anthropic_version: None,
                    max_tokens: request.max_tokens,
                    messages: &request.messages,
                },
            )
        };
        debug!(url = %url, model_id = %model_id, "--> Sending request to inference provider");

        let mut request_builder = self.client.post(&url);
        if !bedrock_style {
            request_builder = request_builder.header("anthropic-version", MESSAGES_API_VERSION);
        }
        if let Some(key) = &self.api_key {
            request_builder = if bedrock_style {
                request_builder.bearer_auth(key)
            } else {
                request_builder.header("x-api-key", key)
            };
        }

        let response = request_builder
            .json(&payload)
            .send()
            .await
            .map_err(ExtractError::AiRequest)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractError::AiApi(format!("status {status}: {error_text}")));
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(ExtractError::AiDeserialization)
    }
}
