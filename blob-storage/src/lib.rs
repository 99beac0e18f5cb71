//! Storage backends for opaque blobs.
//!
//! Every medium implements [`BlobStore`]; [`BackendRegistry`] picks one by
//! name, and [`MetadataStore`] records where each blob's bytes ended up.

pub mod config;
pub mod ftp_store;
pub mod local_store;
pub mod metadata;
pub mod record_store;
pub mod registry;
pub mod s3;
pub mod store;

pub use config::StorageConfig;
pub use metadata::{open_database, BlobHandle, MetadataError, MetadataStore};
pub use registry::BackendRegistry;
pub use store::{BackendKind, BlobStore, BlobStores, StoreError, StoreResult};
