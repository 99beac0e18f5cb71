use std::error::Error;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

use crate::ftp_store::FtpBlobStore;
use crate::local_store::LocalFileBlobStore;
use crate::record_store::RecordBlobStore;
use crate::s3::S3BlobStore;

pub type BoxError = Box<dyn Error + Send + Sync>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a single backend call.
///
/// Absence of data is kept apart from medium errors so callers can tell a
/// missing blob from a broken medium.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no blob data at `{0}`")]
    NotFound(String),

    #[error("failed to store blob `{id}`: {source}")]
    Store {
        id: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to retrieve blob at `{path}`: {source}")]
    Retrieve {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to delete blob at `{path}`: {source}")]
    Delete {
        path: String,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub fn store(id: &str, source: impl Into<BoxError>) -> Self {
        StoreError::Store { id: id.to_string(), source: source.into() }
    }

    pub fn retrieve(path: &str, source: impl Into<BoxError>) -> Self {
        StoreError::Retrieve { path: path.to_string(), source: source.into() }
    }

    pub fn delete(path: &str, source: impl Into<BoxError>) -> Self {
        StoreError::Delete { path: path.to_string(), source: source.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Contract every storage medium implements.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persists `data` under `id` and returns the path to read it back with.
    async fn store(&self, id: &str, data: &[u8]) -> StoreResult<String>;

    /// Reads the full payload at a path previously returned by `store`.
    async fn retrieve(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Removes the payload at `path`.
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Stable lowercase name, persisted alongside each blob's metadata.
    fn name(&self) -> &'static str;
}

/// The closed set of storage media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Local,
    Database,
    S3,
    Ftp,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Local,
        BackendKind::Database,
        BackendKind::S3,
        BackendKind::Ftp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Database => "database",
            BackendKind::S3 => "s3",
            BackendKind::Ftp => "ftp",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown storage backend `{0}`")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownBackend(name.to_string()))
    }
}

#[derive(Debug, Clone)]
pub enum BlobStores {
    Local(LocalFileBlobStore),
    Database(RecordBlobStore),
    S3(S3BlobStore),
    Ftp(FtpBlobStore),
}

impl BlobStores {
    /// Returns a reference to the inner value as a trait object.
    pub fn as_trait(&self) -> &dyn BlobStore {
        match self {
            BlobStores::Local(a) => a,
            BlobStores::Database(b) => b,
            BlobStores::S3(c) => c,
            BlobStores::Ftp(d) => d,
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            BlobStores::Local(_) => BackendKind::Local,
            BlobStores::Database(_) => BackendKind::Database,
            BlobStores::S3(_) => BackendKind::S3,
            BlobStores::Ftp(_) => BackendKind::Ftp,
        }
    }
}
