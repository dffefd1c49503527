//! Shared types and models for the AgriTech advisory platform
//!
//! This crate contains the domain types and the offline decision rules shared
//! between the backend, field clients (via WASM), and other components.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
