mod errors;
mod params;
mod services;

use std::io;

use actix_web::{web, App, HttpServer};
use blob_store::{open_database, BackendRegistry, MetadataStore};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::params::Args;
use crate::services::blob_routes::{configure, AppState, MAX_REQUEST_BYTES};
use crate::services::blob_service::BlobService;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db = open_database(&args.data_dir).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let registry = BackendRegistry::new(&args.storage, db.clone());
    tracing::info!(
        "default storage backend: {} (available: {})",
        registry.current(),
        registry.available().join(", ")
    );

    let state = web::Data::new(AppState {
        blobs: BlobService::new(MetadataStore::new(db), registry),
    });

    tracing::info!("listening on {}", args.http_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(MAX_REQUEST_BYTES))
            .configure(configure)
    })
        .bind(args.http_addr.clone())?
        .run()
        .await
}
