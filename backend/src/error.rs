//! Error types for the Study Agent backend
//!
//! All errors use thiserror for structured error handling.
//! Every error maps onto an HTTP status and is returned to the client
//! as `{"detail": "..."}`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("File too large: uploads are limited to {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Could not extract text: {0}")]
    Extraction(String),

    #[error("Generation service returned an unusable reply: {0}")]
    GenerationFormat(String),

    #[error("Generation service request failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn document_not_found(id: &str) -> Self {
        AppError::NotFound(format!(
            "Context ID {} not found. Please upload the document first.",
            id
        ))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(_) => StatusCode::BAD_REQUEST,
            AppError::GenerationFormat(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Generic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal failures are logged, not leaked.
    fn client_message(&self) -> String {
        match self {
            AppError::Upstream(_) => {
                "The generation service is unavailable. Please try again later.".to_string()
            }
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Generic(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.client_message())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }

        (status, Json(serde_json::json!({ "detail": self }))).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Upstream(format!("request timed out: {}", err))
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Validation(format!("Invalid multipart upload: {}", err.body_text()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::document_not_found("abc").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::PayloadTooLarge { limit: 5 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::GenerationFormat("bad".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Upstream("connection refused at 10.0.0.1".into());
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("10.0.0.1"));

        let err = AppError::Extraction("corrupt archive".into());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("corrupt archive"));
    }

    #[test]
    fn test_generic_errors_are_not_sent_to_client() {
        let err = AppError::Generic("Extraction task failed: task 7 panicked at worker.rs".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Internal server error\"");
    }

    #[test]
    fn test_serialize_writes_plain_string() {
        let value = serde_json::to_value(AppError::document_not_found("abc")).unwrap();
        assert_eq!(
            value,
            serde_json::json!("Context ID abc not found. Please upload the document first.")
        );
    }
}
