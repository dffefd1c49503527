//! AgriTech Advisory Platform - Backend
//!
//! REST gateway for Senegalese farmers: crop disease diagnosis from photos,
//! soil analysis and a farming assistant, each backed by an AI microservice.

use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod services;
pub mod storage;

pub use config::Config;

use external::AiServiceClient;
use repository::DiagnosisRepository;
use storage::{ImageStore, UPLOADS_URL_PREFIX};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repository: Arc<dyn DiagnosisRepository>,
    pub ai_client: AiServiceClient,
    pub images: ImageStore,
}

impl AppState {
    pub fn new(config: Config, repository: Arc<dyn DiagnosisRepository>) -> anyhow::Result<Self> {
        let ai_client = AiServiceClient::new(&config.ai)?;
        let images = ImageStore::new(&config.uploads);

        Ok(Self {
            config: Arc::new(config),
            repository,
            ai_client,
            images,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config))
        .allow_methods(Any)
        .allow_headers(Any);

    let prefix = state.config.server.route_prefix();
    let api = routes::api_routes(&state.config.uploads);

    let router = Router::new().route("/", get(handlers::root));

    // axum cannot nest at the root; the API router already carries /health
    let router = if prefix == "/" {
        router.merge(api)
    } else {
        router
            .route("/health", get(handlers::health_check))
            .nest(&prefix, api)
    };

    router
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(state.images.root()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn allowed_origins(config: &Config) -> AllowOrigin {
    match config.server.cors_origin_list() {
        None => AllowOrigin::any(),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin {}", origin);
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        }
    }
}
