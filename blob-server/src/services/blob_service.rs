use blob_store::{BackendRegistry, BlobHandle, MetadataStore};
use chrono::Utc;

use crate::errors::BlobErr;

/// Sequences metadata and backend calls for the three blob operations.
///
/// Duplicate ids are rejected here, before any backend is touched. Handles
/// are written only after the bytes are stored and removed only after the
/// bytes are deleted.
pub struct BlobService {
    metadata: MetadataStore,
    registry: BackendRegistry,
}

impl BlobService {
    pub fn new(metadata: MetadataStore, registry: BackendRegistry) -> Self {
        Self { metadata, registry }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub async fn store_blob(&self, id: &str, data: &[u8]) -> Result<BlobHandle, BlobErr> {
        if self.metadata.find_by_id(id).await?.is_some() {
            return Err(BlobErr::AlreadyExists(id.to_string()));
        }

        let backend = self.registry.resolve_default().as_trait();
        let storage_path = backend.store(id, data).await?;

        let handle = BlobHandle {
            id: id.to_string(),
            size: data.len() as u64,
            backend_name: backend.name().to_string(),
            storage_path,
            created_at: Utc::now(),
        };
        self.metadata.save(&handle).await?;
        tracing::info!("stored blob {} ({} bytes) in {}", id, handle.size, handle.backend_name);
        Ok(handle)
    }

    pub async fn get_blob(&self, id: &str) -> Result<(BlobHandle, Vec<u8>), BlobErr> {
        let handle = self
            .metadata
            .find_by_id(id)
            .await?
            .ok_or_else(|| BlobErr::NotFound(id.to_string()))?;

        let backend = self.registry.resolve(&handle.backend_name).as_trait();
        match backend.retrieve(&handle.storage_path).await {
            Ok(data) => Ok((handle, data)),
            Err(e) if e.is_not_found() => {
                tracing::warn!("blob {} has metadata but no data: {}", id, e);
                Err(BlobErr::DataMissing(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete_blob(&self, id: &str) -> Result<BlobHandle, BlobErr> {
        let handle = self
            .metadata
            .find_by_id(id)
            .await?
            .ok_or_else(|| BlobErr::NotFound(id.to_string()))?;

        let backend = self.registry.resolve(&handle.backend_name).as_trait();
        backend.delete(&handle.storage_path).await?;
        self.metadata.delete_by_id(id).await?;
        tracing::info!("deleted blob {} from {}", id, handle.backend_name);
        Ok(handle)
    }
}
