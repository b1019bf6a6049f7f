use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::CompletionError;
use crate::schema::SchemaError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"detail": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Transport(String),

    #[error("AI output failed validation: {0}")]
    SchemaViolation(#[from] SchemaError),

    #[error("AI returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("{provider} error (status {status}): {message}")]
    Upstream {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Could not decode audio request: {0}")]
    AudioDecode(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CompletionError> for AppError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::Transport(msg) => AppError::Transport(format!("AI processing failed: {msg}")),
            CompletionError::SchemaViolation(err) => AppError::SchemaViolation(err),
            CompletionError::MalformedOutput(msg) => AppError::MalformedOutput(msg),
        }
    }
}

// Extractor rejections share the `{"detail"}` body with every other error.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::AudioDecode(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Transport(_)
            | AppError::SchemaViolation(_)
            | AppError::MalformedOutput(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self:?}");
        } else {
            tracing::debug!("Rejected request: {self}");
        }

        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
