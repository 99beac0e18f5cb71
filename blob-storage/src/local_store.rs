use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::store::{BlobStore, StoreError, StoreResult};

/// Stores each blob as a file named after its id under a root directory.
///
/// Ids are used verbatim as path segments.
#[derive(Clone, Debug)]
pub struct LocalFileBlobStore {
    base_path: PathBuf,
}

impl LocalFileBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }
}

#[async_trait]
impl BlobStore for LocalFileBlobStore {
    async fn store(&self, id: &str, data: &[u8]) -> StoreResult<String> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StoreError::store(id, e))?;

        let file_path = self.base_path.join(id);
        fs::write(&file_path, data)
            .await
            .map_err(|e| StoreError::store(id, e))?;
        tracing::debug!("wrote {} bytes to {}", data.len(), file_path.display());
        Ok(file_path.to_string_lossy().into_owned())
    }

    async fn retrieve(&self, path: &str) -> StoreResult<Vec<u8>> {
        fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
            _ => StoreError::retrieve(path, e),
        })
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        fs::remove_file(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
            _ => StoreError::delete(path, e),
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
