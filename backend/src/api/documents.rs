//! Document upload and listing handlers

use crate::app::AppState;
use crate::database::DocumentSummary;
use crate::error::{AppError, Result};
use crate::services::documents::text_snippet;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub context_id: String,
    pub filename: String,
    pub text_length: i64,
    pub text_snippet: String,
}

/// POST /upload
///
/// Takes the first multipart field that carries a filename.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let limit = state.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, limit))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field.bytes().await.map_err(|e| upload_error(e, limit))?;
        let document = state.documents_service.save(&filename, data.to_vec()).await?;

        return Ok(Json(UploadResponse {
            text_snippet: text_snippet(&document.text_content),
            context_id: document.id,
            filename: document.filename,
            text_length: document.text_length,
        }));
    }

    Err(AppError::Validation(
        "Request must include a file field".to_string(),
    ))
}

fn upload_error(err: axum::extract::multipart::MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::from(err)
    }
}

/// GET /documents
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<DocumentSummary>>> {
    Ok(Json(state.documents_service.list().await?))
}

/// GET /documents/:id
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentSummary>> {
    Ok(Json(state.documents_service.get_summary(&id).await?))
}
