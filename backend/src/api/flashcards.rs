//! Flashcard handlers

use super::{ApiJson, ContextRequest};
use crate::app::AppState;
use crate::database::Flashcard;
use crate::error::Result;
use crate::generation::QaPair;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct FlashcardsResponse {
    pub flashcards: Vec<QaPair>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub correct: bool,
}

/// POST /flashcards
pub async fn generate_flashcards(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ContextRequest>,
) -> Result<Json<FlashcardsResponse>> {
    let flashcards = state
        .flashcards_service
        .generate(&request.context_id)
        .await?;
    Ok(Json(FlashcardsResponse { flashcards }))
}

/// GET /flashcards/:context_id
pub async fn list_flashcards(
    State(state): State<AppState>,
    Path(context_id): Path<String>,
) -> Result<Json<Vec<Flashcard>>> {
    Ok(Json(state.flashcards_service.list(&context_id).await?))
}

/// POST /flashcards/:flashcard_id/review
pub async fn review_flashcard(
    State(state): State<AppState>,
    Path(flashcard_id): Path<String>,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> Result<Json<Flashcard>> {
    let flashcard = state
        .flashcards_service
        .review(&flashcard_id, request.correct)
        .await?;
    Ok(Json(flashcard))
}
