//! Configuration management for the AgriTech advisory API
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with AGRI__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Downstream AI microservices
    pub ai: AiConfig,

    /// Image upload handling
    pub uploads: UploadConfig,

    /// Identity defaults
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,

    /// Prefix for every API route, without slashes (e.g. "api/v1")
    pub api_prefix: String,

    /// Comma separated CORS origins, "*" for any
    pub cors_origins: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; empty keeps diagnoses in memory
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Disease detection service base URL
    pub disease_detection_url: String,

    /// Soil analysis service base URL
    pub soil_analysis_url: String,

    /// Farming assistant service base URL
    pub assistant_url: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Directory where images are written
    pub destination: String,

    /// Largest accepted image in bytes
    pub max_file_size: usize,

    /// Comma separated MIME types
    pub allowed_image_types: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// User id applied when the request carries no identity
    pub default_user_id: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AGRI_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.api_prefix", "api/v1")?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("ai.disease_detection_url", "http://localhost:8001")?
            .set_default("ai.soil_analysis_url", "http://localhost:8002")?
            .set_default("ai.assistant_url", "http://localhost:8003")?
            .set_default("ai.timeout_ms", 30000)?
            .set_default("uploads.destination", "./uploads")?
            .set_default("uploads.max_file_size", 5 * 1024 * 1024)?
            .set_default("uploads.allowed_image_types", "image/jpeg,image/png,image/jpg")?
            .set_default("auth.default_user_id", "user-id-placeholder")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRI__ prefix)
            .add_source(
                Environment::with_prefix("AGRI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ServerConfig {
    /// Prefix as a route path, e.g. "/api/v1"
    pub fn route_prefix(&self) -> String {
        format!("/{}", self.api_prefix.trim_matches('/'))
    }

    /// Explicit origins, `None` when any origin is allowed
    pub fn cors_origin_list(&self) -> Option<Vec<String>> {
        let origins = split_list(&self.cors_origins);
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

impl UploadConfig {
    pub fn allowed_types(&self) -> Vec<String> {
        split_list(&self.allowed_image_types)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            api_prefix: "api/v1".to_string(),
            cors_origins: "*".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            disease_detection_url: "http://localhost:8001".to_string(),
            soil_analysis_url: "http://localhost:8002".to_string(),
            assistant_url: "http://localhost:8003".to_string(),
            timeout_ms: 30000,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            destination: "./uploads".to_string(),
            max_file_size: 5 * 1024 * 1024,
            allowed_image_types: "image/jpeg,image/png,image/jpg".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_user_id: "user-id-placeholder".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_prefix_normalization() {
        let mut server = ServerConfig::default();
        assert_eq!(server.route_prefix(), "/api/v1");
        server.api_prefix = "/api/v2/".to_string();
        assert_eq!(server.route_prefix(), "/api/v2");
    }

    #[test]
    fn test_cors_origins() {
        let mut server = ServerConfig::default();
        assert_eq!(server.cors_origin_list(), None);
        server.cors_origins = "https://a.sn, https://b.sn".to_string();
        assert_eq!(
            server.cors_origin_list(),
            Some(vec!["https://a.sn".to_string(), "https://b.sn".to_string()])
        );
    }

    #[test]
    fn test_allowed_image_types() {
        let uploads = UploadConfig::default();
        assert_eq!(
            uploads.allowed_types(),
            vec!["image/jpeg", "image/png", "image/jpg"]
        );
    }
}
