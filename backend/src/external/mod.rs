//! External API integrations

pub mod ai_service;

pub use ai_service::{AiEndpoint, AiServiceClient, ServiceUnavailable};
