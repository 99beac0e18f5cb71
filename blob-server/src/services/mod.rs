pub mod blob_routes;
pub mod blob_service;
