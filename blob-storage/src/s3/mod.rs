pub mod s3_store;
pub mod signing;

pub use s3_store::S3BlobStore;
