//! Quiz handlers

use super::ApiJson;
use crate::app::AppState;
use crate::config::DEFAULT_QUIZ_QUESTIONS;
use crate::database::Difficulty;
use crate::error::Result;
use crate::generation::QaPair;
use crate::services::GradeReport;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

fn default_question_count() -> u32 {
    DEFAULT_QUIZ_QUESTIONS
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub context_id: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_question_count")]
    pub num_questions: u32,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<QaPair>,
}

#[derive(Debug, Deserialize)]
pub struct GradeQuizRequest {
    pub quiz_data: Vec<QaPair>,
    pub user_answers: Vec<String>,
    pub context_id: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// POST /quiz/generate
pub async fn generate_quiz(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateQuizRequest>,
) -> Result<Json<QuestionsResponse>> {
    let questions = state
        .quiz_service
        .generate(&request.context_id, request.difficulty, request.num_questions)
        .await?;
    Ok(Json(QuestionsResponse { questions }))
}

/// POST /quiz/grade
pub async fn grade_quiz(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GradeQuizRequest>,
) -> Result<Json<GradeReport>> {
    let report = state
        .quiz_service
        .grade(
            &request.context_id,
            request.difficulty,
            &request.quiz_data,
            &request.user_answers,
        )
        .await?;
    Ok(Json(report))
}
