//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::repository::StorageStatus;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: StorageStatus,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.repository.status().await,
    })
}

/// Root endpoint
pub async fn root() -> &'static str {
    "AgriTech Advisory Platform API v1.0"
}
