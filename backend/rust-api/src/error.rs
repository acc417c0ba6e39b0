use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the game services. Every variant maps to exactly one
/// HTTP status so handlers can just return `AppResult`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// The target exists but is in a state that forbids the operation
    /// (e.g. an attempt against a completed session).
    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // The game frontend has always received 400 for a completed session
            AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Internal(msg) => tracing::error!("Request failed: {}", msg),
            other => tracing::warn!("Request rejected ({}): {}", status.as_u16(), other),
        }

        let body = json!({
            "detail": self.to_string(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
