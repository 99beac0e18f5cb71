use actix_web::{delete, get, post, web, HttpResponse, Responder};
use actix_web::web::Data;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blob_store::BlobHandle;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::BlobErr;
use crate::services::blob_service::BlobService;

pub const APP_TYPE_JSON: &str = "application/json";

/// Longest id accepted, in bytes.
pub const MAX_ID_BYTES: usize = 255;
/// Largest decoded payload accepted.
pub const MAX_BLOB_BYTES: usize = 10 * 1024 * 1024;
/// Request body limit; leaves room for base64 expansion of `MAX_BLOB_BYTES`.
pub const MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

pub struct AppState {
    pub(crate) blobs: BlobService,
}

#[derive(Serialize, Deserialize, Validate)]
struct CreateBlobRequest {
    #[validate(length(min = 1))]
    id: String,
    #[validate(length(min = 1))]
    data: String,
}

#[derive(Serialize, Deserialize)]
struct BlobResponse {
    id: String,
    data: String,
    size: String,
    created_at: String,
}

impl BlobResponse {
    fn new(handle: &BlobHandle, data: String) -> Self {
        Self {
            id: handle.id.clone(),
            data,
            size: handle.size.to_string(),
            created_at: handle.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DeleteBlobResponse {
    message: String,
    id: String,
    storage_backend: String,
}

#[derive(Serialize, Deserialize)]
struct BackendsResponse {
    current: String,
    available: Vec<String>,
}

/// Decodes a base64 payload and enforces the 1 byte..10 MiB bound.
fn decode_payload(data: &str) -> Result<Vec<u8>, BlobErr> {
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| BlobErr::InvalidPayload(format!("invalid base64 data: {e}")))?;
    if bytes.is_empty() || bytes.len() > MAX_BLOB_BYTES {
        return Err(BlobErr::InvalidPayload(format!(
            "payload must be between 1 and {MAX_BLOB_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[post("/v1/blobs")]
async fn create_blob(
    request_json_bytes: web::Bytes,
    shared_state: Data<AppState>,
) -> impl Responder {
    // Parse the incoming JSON.
    let req: CreateBlobRequest = match serde_json::from_slice(&request_json_bytes) {
        Ok(req) => req,
        Err(parse_err) => return HttpResponse::from_error(BlobErr::Json(parse_err)),
    };

    if let Err(validation_err) = req.validate() {
        return HttpResponse::BadRequest().json(validation_err);
    }
    // validator counts chars, ids are bounded in bytes
    if req.id.len() > MAX_ID_BYTES {
        return HttpResponse::from_error(BlobErr::InvalidPayload(format!(
            "id must be at most {MAX_ID_BYTES} bytes, got {}",
            req.id.len()
        )));
    }

    let payload = match decode_payload(&req.data) {
        Ok(payload) => payload,
        Err(e) => return HttpResponse::from_error(e),
    };

    match shared_state.blobs.store_blob(&req.id, &payload).await {
        Ok(handle) => HttpResponse::Created()
            .content_type(APP_TYPE_JSON)
            .json(BlobResponse::new(&handle, req.data)),
        Err(e) => HttpResponse::from_error(e),
    }
}

#[get("/v1/blobs/{id}")]
async fn get_blob(
    id: web::Path<String>,
    shared_state: Data<AppState>,
) -> Result<HttpResponse, BlobErr> {
    let (handle, data) = shared_state.blobs.get_blob(&id).await?;
    Ok(HttpResponse::Ok()
        .content_type(APP_TYPE_JSON)
        .json(BlobResponse::new(&handle, STANDARD.encode(data))))
}

#[delete("/v1/blobs/{id}")]
async fn delete_blob(
    id: web::Path<String>,
    shared_state: Data<AppState>,
) -> Result<HttpResponse, BlobErr> {
    let handle = shared_state.blobs.delete_blob(&id).await?;
    Ok(HttpResponse::Ok().content_type(APP_TYPE_JSON).json(DeleteBlobResponse {
        message: format!("Blob with ID {} has been deleted successfully", handle.id),
        id: handle.id,
        storage_backend: handle.backend_name,
    }))
}

#[get("/v1/storage/backends")]
async fn list_backends(shared_state: Data<AppState>) -> impl Responder {
    let registry = shared_state.blobs.registry();
    HttpResponse::Ok().content_type(APP_TYPE_JSON).json(BackendsResponse {
        current: registry.current().to_string(),
        available: registry.available().into_iter().map(str::to_string).collect(),
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_blob)
        .service(get_blob)
        .service(delete_blob)
        .service(list_backends);
}
