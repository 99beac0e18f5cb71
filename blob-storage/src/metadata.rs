use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, DB};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task;

/// Column family holding one JSON `BlobHandle` per blob id.
pub const BLOBS_CF: &str = "blobs";
/// Column family holding raw payloads for the `database` backend.
pub const BLOB_DATA_CF: &str = "blob_data";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata database error: {0}")]
    Db(#[from] rocksdb::Error),

    #[error("corrupt metadata record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("column family `{0}` is missing")]
    MissingColumnFamily(&'static str),

    #[error("database task did not complete: {0}")]
    Join(#[from] task::JoinError),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

/// Records which backend, and where in it, holds a blob's bytes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub id: String,
    pub size: u64,
    pub backend_name: String,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

/// Opens (or creates) the metadata database with every column family the
/// service uses.
pub fn open_database<P: AsRef<Path>>(db_path: P) -> MetadataResult<Arc<DB>> {
    let mut db_opts = Options::default();
    db_opts.create_missing_column_families(true);
    db_opts.create_if_missing(true);

    let blobs = ColumnFamilyDescriptor::new(BLOBS_CF, Options::default());
    let blob_data = ColumnFamilyDescriptor::new(BLOB_DATA_CF, Options::default());

    let db = DB::open_cf_descriptors(&db_opts, db_path, vec![blobs, blob_data])?;
    Ok(Arc::new(db))
}

fn column_family<'a>(db: &'a DB, name: &'static str) -> MetadataResult<&'a ColumnFamily> {
    db.cf_handle(name).ok_or(MetadataError::MissingColumnFamily(name))
}

/// Runs `op` against one column family on the blocking pool.
pub(crate) async fn with_column_family<T, F>(db: &Arc<DB>, name: &'static str, op: F) -> MetadataResult<T>
where
    T: Send + 'static,
    F: FnOnce(&DB, &ColumnFamily) -> MetadataResult<T> + Send + 'static,
{
    let db = db.clone();
    task::spawn_blocking(move || op(&db, column_family(&db, name)?)).await?
}

/// CRUD over blob handles.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    db: Arc<DB>,
}

impl MetadataStore {
    pub fn new(db: Arc<DB>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: &str) -> MetadataResult<Option<BlobHandle>> {
        let key = id.to_string();
        let bytes = with_column_family(&self.db, BLOBS_CF, move |db, blobs| {
            Ok(db.get_cf(blobs, key.as_bytes())?)
        })
        .await?;
        bytes
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(MetadataError::from)
    }

    pub async fn save(&self, handle: &BlobHandle) -> MetadataResult<()> {
        let key = handle.id.clone();
        let value = serde_json::to_vec(handle)?;
        with_column_family(&self.db, BLOBS_CF, move |db, blobs| {
            Ok(db.put_cf(blobs, key.as_bytes(), value)?)
        })
        .await
    }

    /// Removes the handle for `id`; a missing handle is not an error.
    pub async fn delete_by_id(&self, id: &str) -> MetadataResult<()> {
        let key = id.to_string();
        with_column_family(&self.db, BLOBS_CF, move |db, blobs| {
            Ok(db.delete_cf(blobs, key.as_bytes())?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn handle(id: &str) -> BlobHandle {
        BlobHandle {
            id: id.to_string(),
            size: 12,
            backend_name: "local".to_string(),
            storage_path: format!("./storage/{id}"),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_then_find() {
        let temp_dir = tempdir().unwrap();
        let metadata = MetadataStore::new(open_database(temp_dir.path()).unwrap());

        let saved = handle("k1");
        metadata.save(&saved).await.unwrap();

        assert_eq!(metadata.find_by_id("k1").await.unwrap(), Some(saved));
        assert_eq!(metadata.find_by_id("k2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let temp_dir = tempdir().unwrap();
        let metadata = MetadataStore::new(open_database(temp_dir.path()).unwrap());

        metadata.save(&handle("k1")).await.unwrap();
        metadata.delete_by_id("k1").await.unwrap();
        assert_eq!(metadata.find_by_id("k1").await.unwrap(), None);

        // deleting again is a no-op
        metadata.delete_by_id("k1").await.unwrap();
    }

    #[tokio::test]
    async fn test_handles_survive_reopen() {
        let temp_dir = tempdir().unwrap();
        let saved = handle("persistent");
        {
            let metadata = MetadataStore::new(open_database(temp_dir.path()).unwrap());
            metadata.save(&saved).await.unwrap();
        }
        let metadata = MetadataStore::new(open_database(temp_dir.path()).unwrap());
        assert_eq!(metadata.find_by_id("persistent").await.unwrap(), Some(saved));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_saves_from_spawned_tasks() {
        let temp_dir = tempdir().unwrap();
        let metadata = MetadataStore::new(open_database(temp_dir.path()).unwrap());

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let metadata = metadata.clone();
                tokio::spawn(async move { metadata.save(&handle(&format!("k{i}"))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        for i in 0..32 {
            assert!(metadata.find_by_id(&format!("k{i}")).await.unwrap().is_some());
        }
    }
}
