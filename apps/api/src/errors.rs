use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::pipeline::AnalysisError;
use crate::ingest::IngestError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every failure the service can surface maps to exactly one of these kinds.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Too large: {0}")]
    TooLarge(String),

    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    #[error("Analysis timeout: {0}")]
    AnalysisTimeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidFormat { .. } => AppError::InvalidFormat(err.to_string()),
            IngestError::TooLarge { .. } => AppError::TooLarge(err.to_string()),
            IngestError::Unreadable(_) => AppError::UnreadableDocument(err.to_string()),
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Ingest(e) => e.into(),
            AnalysisError::Timeout(limit) => AppError::AnalysisTimeout(format!(
                "analysis did not finish within {}s; try a smaller document",
                limit.as_secs()
            )),
            AnalysisError::Cancelled => {
                AppError::Internal(anyhow::anyhow!("analysis was cancelled before completion"))
            }
            AnalysisError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "INVALID_FORMAT",
                msg.clone(),
            ),
            AppError::TooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, "TOO_LARGE", msg.clone()),
            AppError::UnreadableDocument(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNREADABLE_DOCUMENT",
                msg.clone(),
            ),
            AppError::AnalysisTimeout(msg) => {
                tracing::warn!("Analysis timeout: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "ANALYSIS_TIMEOUT", msg.clone())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
