use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::DB;

use crate::metadata::{with_column_family, BLOB_DATA_CF};
use crate::store::{BlobStore, StoreError, StoreResult};

/// Keeps payloads as rows of the metadata database, keyed by blob id.
///
/// The storage path handed back by `store` is the id itself.
#[derive(Clone, Debug)]
pub struct RecordBlobStore {
    db: Arc<DB>,
}

impl RecordBlobStore {
    pub fn new(db: Arc<DB>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlobStore for RecordBlobStore {
    async fn store(&self, id: &str, data: &[u8]) -> StoreResult<String> {
        let key = id.to_string();
        let value = data.to_vec();
        with_column_family(&self.db, BLOB_DATA_CF, move |db, blob_data| {
            Ok(db.put_cf(blob_data, key.as_bytes(), value)?)
        })
        .await
        .map_err(|e| StoreError::store(id, e))?;
        tracing::debug!("stored {} bytes for {} in {}", data.len(), id, BLOB_DATA_CF);
        Ok(id.to_string())
    }

    async fn retrieve(&self, path: &str) -> StoreResult<Vec<u8>> {
        let key = path.to_string();
        with_column_family(&self.db, BLOB_DATA_CF, move |db, blob_data| {
            Ok(db.get_cf(blob_data, key.as_bytes())?)
        })
        .await
        .map_err(|e| StoreError::retrieve(path, e))?
        .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        // rocksdb deletes are blind, so a missing row is not an error
        let key = path.to_string();
        with_column_family(&self.db, BLOB_DATA_CF, move |db, blob_data| {
            Ok(db.delete_cf(blob_data, key.as_bytes())?)
        })
        .await
        .map_err(|e| StoreError::delete(path, e))
    }

    fn name(&self) -> &'static str {
        "database"
    }
}
