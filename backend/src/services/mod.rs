//! Business logic services for the AgriTech advisory API

pub mod assistant;
pub mod diagnosis;
pub mod soil;

pub use assistant::AssistantService;
pub use diagnosis::{CreateDiagnosisInput, DiagnosisService, UploadedImage};
pub use soil::SoilService;
