//! HTTP handlers for soil analysis endpoints

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use shared::{SoilAnalysisInput, SoilAnalysisResult};

use crate::error::{AppError, AppResult};
use crate::services::SoilService;
use crate::AppState;

/// Analyze soil measurements
pub async fn analyze_soil(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<SoilAnalysisInput>, AppError>,
) -> AppResult<Json<SoilAnalysisResult>> {
    let service = SoilService::new(state.ai_client);
    let result = service.analyze_soil(input).await?;
    Ok(Json(result))
}
