use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use blob_store::{MetadataError, StoreError};
use serde_json::error::Error as SerdeError;
use thiserror::Error;


#[derive(Debug, Error)]
pub enum BlobErr {
    #[error("Failed to parse JSON")]
    Json(#[from] SerdeError),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("File with ID '{0}' already exists")]
    AlreadyExists(String),

    #[error("Blob with ID {0} not found")]
    NotFound(String),

    #[error("File data not found in storage for ID {0}")]
    DataMissing(String),

    #[error("Storage backend failed: {0}")]
    Storage(#[from] StoreError),

    #[error("Metadata store failed: {0}")]
    Metadata(#[from] MetadataError),
}

impl ResponseError for BlobErr {
    fn status_code(&self) -> StatusCode {
        match self {
            BlobErr::Json(_) | BlobErr::InvalidPayload(_) | BlobErr::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            BlobErr::NotFound(_) | BlobErr::DataMissing(_) => StatusCode::NOT_FOUND,
            BlobErr::Storage(_) | BlobErr::Metadata(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
