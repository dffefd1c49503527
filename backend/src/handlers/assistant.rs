//! HTTP handlers for the farming assistant

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use shared::{AssistantAnswer, AssistantQuestion};

use crate::error::{AppError, AppResult};
use crate::services::AssistantService;
use crate::AppState;

/// Ask the farming assistant a question
pub async fn ask(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<AssistantQuestion>, AppError>,
) -> AppResult<Json<AssistantAnswer>> {
    let service = AssistantService::new(state.ai_client);
    let answer = service.get_answer(input).await?;
    Ok(Json(answer))
}
