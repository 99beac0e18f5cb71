use std::sync::Arc;

use rocksdb::DB;

use crate::config::StorageConfig;
use crate::ftp_store::FtpBlobStore;
use crate::local_store::LocalFileBlobStore;
use crate::record_store::RecordBlobStore;
use crate::s3::S3BlobStore;
use crate::store::{BackendKind, BlobStores};

/// Owns one instance of every backend and hands them out by name.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    local: BlobStores,
    database: BlobStores,
    s3: BlobStores,
    ftp: BlobStores,
    default_backend: String,
}

impl BackendRegistry {
    /// Builds every backend from `config`. Nothing is contacted yet, so
    /// missing credentials only surface when a backend is first used.
    pub fn new(config: &StorageConfig, db: Arc<DB>) -> Self {
        Self {
            local: BlobStores::Local(LocalFileBlobStore::new(&config.local_storage_path)),
            database: BlobStores::Database(RecordBlobStore::new(db)),
            s3: BlobStores::S3(S3BlobStore::new(&config.s3)),
            ftp: BlobStores::Ftp(FtpBlobStore::new(&config.ftp)),
            default_backend: config.default_backend().to_string(),
        }
    }

    pub fn get(&self, kind: BackendKind) -> &BlobStores {
        match kind {
            BackendKind::Local => &self.local,
            BackendKind::Database => &self.database,
            BackendKind::S3 => &self.s3,
            BackendKind::Ftp => &self.ftp,
        }
    }

    /// Looks a backend up by name, ignoring case.
    ///
    /// Unknown names do not fail: they are logged and served by the local
    /// file backend.
    pub fn resolve(&self, name: &str) -> &BlobStores {
        match name.parse::<BackendKind>() {
            Ok(kind) => self.get(kind),
            Err(unknown) => {
                tracing::warn!("{}; falling back to local storage", unknown);
                &self.local
            }
        }
    }

    pub fn resolve_default(&self) -> &BlobStores {
        self.resolve(&self.default_backend)
    }

    pub fn available(&self) -> Vec<&'static str> {
        BackendKind::ALL.iter().map(BackendKind::as_str).collect()
    }

    pub fn is_available(&self, name: &str) -> bool {
        name.parse::<BackendKind>().is_ok()
    }

    /// Name of the configured default backend, as configured.
    pub fn current(&self) -> &str {
        &self.default_backend
    }
}
