//! Revision planner handlers

use super::{ApiJson, ContextRequest};
use crate::app::AppState;
use crate::database::{PlanData, RevisionPlan};
use crate::error::Result;
use crate::services::TopicWeight;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<TopicWeight>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub context_id: String,
    #[serde(default)]
    pub exam_date: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
}

/// POST /planner/topics
pub async fn analyze_topics(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ContextRequest>,
) -> Result<Json<TopicsResponse>> {
    let topics = state
        .planner_service
        .analyze_topics(&request.context_id)
        .await?;
    Ok(Json(TopicsResponse { topics }))
}

/// POST /planner/create
pub async fn create_plan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePlanRequest>,
) -> Result<Json<PlanData>> {
    let plan = state
        .planner_service
        .create_plan(
            &request.context_id,
            request.exam_date.as_deref(),
            request.topics,
        )
        .await?;
    Ok(Json(plan))
}

/// GET /planner/plans/:context_id
pub async fn list_plans(
    State(state): State<AppState>,
    Path(context_id): Path<String>,
) -> Result<Json<Vec<RevisionPlan>>> {
    Ok(Json(state.planner_service.list_plans(&context_id).await?))
}
