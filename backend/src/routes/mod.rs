//! Route definitions for the AgriTech advisory API

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{config::UploadConfig, handlers, AppState};

/// Room left in the request body for the text fields and multipart framing
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create API routes
pub fn api_routes(uploads: &UploadConfig) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/diagnosis", diagnosis_routes(uploads))
        .nest("/soil", soil_routes())
        .nest("/assistant", assistant_routes())
}

/// Crop disease diagnosis routes
fn diagnosis_routes(uploads: &UploadConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/crop-disease",
            post(handlers::create_diagnosis).layer(DefaultBodyLimit::max(
                uploads.max_file_size + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route("/history", get(handlers::get_history))
        .route("/stats/overview", get(handlers::get_statistics))
        .route("/:id", get(handlers::get_diagnosis))
}

/// Soil analysis routes
fn soil_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(handlers::analyze_soil))
}

/// Farming assistant routes
fn assistant_routes() -> Router<AppState> {
    Router::new().route("/ask", post(handlers::ask))
}
