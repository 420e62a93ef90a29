//! HTTP API
//!
//! Builds the axum `Router` with CORS, request tracing and the shared
//! application state. Handlers are grouped by concern:
//! - `documents`: upload, listing and lookup
//! - `flashcards`: generation, listing and review
//! - `quiz`: generation and grading
//! - `planner`: topic analysis and revision plans
//! - `insights`: doubt answering and performance stats
//!
//! | Method & Path                  | Handler                          |
//! |--------------------------------|----------------------------------|
//! | `GET /`                        | health check                     |
//! | `POST /upload`                 | `documents::upload`              |
//! | `GET /documents`               | `documents::list_documents`      |
//! | `GET /documents/:id`           | `documents::get_document`        |
//! | `POST /flashcards`             | `flashcards::generate_flashcards`|
//! | `GET /flashcards/:id`          | `flashcards::list_flashcards`    |
//! | `POST /flashcards/:id/review`  | `flashcards::review_flashcard`   |
//! | `POST /quiz/generate`          | `quiz::generate_quiz`            |
//! | `POST /quiz/grade`             | `quiz::grade_quiz`               |
//! | `POST /doubt`                  | `insights::ask_doubt`            |
//! | `POST /planner/topics`         | `planner::analyze_topics`        |
//! | `POST /planner/create`         | `planner::create_plan`           |
//! | `GET /planner/plans/:id`       | `planner::list_plans`            |
//! | `GET /performance/:id`         | `insights::performance`          |

pub mod documents;
pub mod flashcards;
pub mod insights;
pub mod planner;
pub mod quiz;

use crate::app::AppState;
use crate::config::{allows_any_origin, MULTIPART_OVERHEAD_BYTES};
use crate::error::AppError;
use axum::extract::{DefaultBodyLimit, FromRequest};
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// JSON body extractor whose rejections use the API error format
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Request body naming only a document
#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    pub context_id: String,
}

#[derive(Serialize)]
struct HealthResponse {
    message: &'static str,
}

/// Build the complete HTTP application
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let upload_limit = state
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(health_check))
        .route(
            "/upload",
            post(documents::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/documents", get(documents::list_documents))
        .route("/documents/:id", get(documents::get_document))
        .route("/flashcards", post(flashcards::generate_flashcards))
        .route("/flashcards/:id", get(flashcards::list_flashcards))
        .route("/flashcards/:id/review", post(flashcards::review_flashcard))
        .route("/quiz/generate", post(quiz::generate_quiz))
        .route("/quiz/grade", post(quiz::grade_quiz))
        .route("/doubt", post(insights::ask_doubt))
        .route("/planner/topics", post(planner::analyze_topics))
        .route("/planner/create", post(planner::create_plan))
        .route("/planner/plans/:id", get(planner::list_plans))
        .route("/performance/:id", get(insights::performance))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(cors_origins))
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Study Agent API is running.",
    })
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if allows_any_origin(origins) {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.trim().parse().ok())
            .collect();
        if parsed.is_empty() {
            tracing::warn!(
                "None of the configured CORS origins {:?} are valid; cross-origin requests will be refused",
                origins
            );
        }
        cors.allow_origin(parsed)
    }
}
