//! Soil analysis service

use shared::{offline_soil_analysis, validate_soil_input, SoilAnalysisInput, SoilAnalysisResult};

use crate::error::AppResult;
use crate::external::ai_service::SoilAnalysisRequest;
use crate::external::AiServiceClient;

/// Soil analysis through the AI service, with the rule-based analysis as fallback
#[derive(Clone)]
pub struct SoilService {
    ai_client: AiServiceClient,
}

impl SoilService {
    pub fn new(ai_client: AiServiceClient) -> Self {
        Self { ai_client }
    }

    /// Analyze soil measurements; only invalid input is an error
    pub async fn analyze_soil(&self, input: SoilAnalysisInput) -> AppResult<SoilAnalysisResult> {
        validate_soil_input(&input)?;
        tracing::info!("Analyzing soil data for {}", input.region);

        match self
            .ai_client
            .analyze_soil(&SoilAnalysisRequest::from(&input))
            .await
        {
            Ok(response) => Ok(response.into()),
            Err(e) => {
                tracing::warn!("{}; using offline soil analysis", e);
                Ok(offline_soil_analysis(&input))
            }
        }
    }
}
