use crate::{errors::ExtractError, providers::object::ObjectStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// An object store backed by a directory tree: `{root}/{container}/{key}`.
///
/// Useful for running the pipeline locally against files on disk.
#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the on-disk path, refusing anything that would leave `root`.
    fn resolve(&self, container: &str, key: &str) -> Result<PathBuf, ExtractError> {
        let relative = Path::new(container).join(key.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(ExtractError::ObjectFetch(format!(
                "refusing to read outside the store root: {container}/{key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "Local"
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, ExtractError> {
        let path = self.resolve(container, key)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExtractError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            },
            _ => ExtractError::ObjectFetch(format!("{}: {e}", path.display())),
        })
    }
}
