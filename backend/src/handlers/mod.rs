//! HTTP handlers for the AgriTech advisory API

pub mod assistant;
pub mod diagnosis;
pub mod health;
pub mod soil;

pub use assistant::ask;
pub use diagnosis::{create_diagnosis, get_diagnosis, get_history, get_statistics};
pub use health::{health_check, root};
pub use soil::analyze_soil;
