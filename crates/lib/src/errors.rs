use thiserror::Error;

/// Custom error types for the extraction pipeline.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Handler is missing a required collaborator: {0}")]
    MissingCollaborator(&'static str),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("The object '{key}' was not found in '{container}'")]
    ObjectNotFound { container: String, key: String },
    #[error("Failed to fetch object from the object store: {0}")]
    ObjectFetch(String),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider response contained no text content")]
    EmptyModelResponse,
    #[error("Storage provider connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),
    #[error("Malformed event notification: {0}")]
    MalformedEvent(String),
    #[error("JSON serialization/deserialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl From<turso::Error> for ExtractError {
    fn from(err: turso::Error) -> Self {
        ExtractError::StorageOperationFailed(err.to_string())
    }
}
