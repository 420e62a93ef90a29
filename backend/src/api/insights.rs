//! Doubt and performance handlers

use super::ApiJson;
use crate::app::AppState;
use crate::error::Result;
use crate::services::{DoubtAnswer, PerformanceStats};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DoubtRequest {
    pub context_id: String,
    pub question: String,
}

/// POST /doubt
pub async fn ask_doubt(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DoubtRequest>,
) -> Result<Json<DoubtAnswer>> {
    let answer = state
        .doubt_service
        .ask(&request.context_id, &request.question)
        .await?;
    Ok(Json(answer))
}

/// GET /performance/:context_id
pub async fn performance(
    State(state): State<AppState>,
    Path(context_id): Path<String>,
) -> Result<Json<PerformanceStats>> {
    Ok(Json(state.analytics_service.stats(&context_id).await?))
}
