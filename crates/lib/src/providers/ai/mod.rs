pub mod anthropic;
pub mod messages;

use crate::errors::ExtractError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use messages::{media_type_for_key, MessagesRequest, MessagesResponse};
use std::fmt::Debug;

/// A trait for interacting with a multimodal inference service.
///
/// Implementations send a prepared request to the model identified by
/// `model_id` and return the decoded response body. Choosing which part of the
/// response to use is left to the caller.
#[async_trait]
pub trait InferenceClient: Send + Sync + Debug + DynClone {
    async fn complete(
        &self,
        model_id: &str,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, ExtractError>;
}

dyn_clone::clone_trait_object!(InferenceClient);
