//! AgriTech Advisory Platform - Backend Server

use std::{sync::Arc, time::Duration};

use agritech_backend::{
    create_app,
    repository::{DiagnosisRepository, InMemoryDiagnosisRepository, PgDiagnosisRepository},
    AppState, Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "agritech_server=debug,agritech_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting AgriTech Advisory Server");
    tracing::info!("Environment: {}", config.environment);

    let repository = connect_repository(&config).await?;

    // Create application state
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let prefix = config.server.route_prefix();
    let state = AppState::new(config, repository)?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {} (API under {})", addr, prefix);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// PostgreSQL when a database URL is configured, otherwise an in-memory store
async fn connect_repository(config: &Config) -> anyhow::Result<Arc<dyn DiagnosisRepository>> {
    if config.database.url.trim().is_empty() {
        tracing::warn!("No database URL configured, diagnoses are kept in memory");
        return Ok(Arc::new(InMemoryDiagnosisRepository::new()));
    }

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    Ok(Arc::new(PgDiagnosisRepository::new(db_pool)))
}
