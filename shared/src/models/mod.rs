//! Domain models for the AgriTech advisory platform

mod assistant;
mod diagnosis;
mod soil;

pub use assistant::*;
pub use diagnosis::*;
pub use soil::*;
