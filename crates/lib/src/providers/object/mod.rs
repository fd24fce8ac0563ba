pub mod http;
pub mod local;

use crate::errors::ExtractError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for reading objects from a bucket-style store.
///
/// Objects are addressed by a container (bucket) name and a key.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug + DynClone {
    /// Returns the name of the object store (e.g., "HTTP", "Local").
    fn name(&self) -> &str;

    /// Fetches the full contents of the object at (`container`, `key`).
    ///
    /// A missing object is reported as `ExtractError::ObjectNotFound`.
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, ExtractError>;
}

dyn_clone::clone_trait_object!(ObjectStore);
