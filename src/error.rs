use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid availability rule: {0}")]
    InvalidRule(String),

    #[error("Invalid service duration: {0} minutes")]
    InvalidDuration(i32),

    #[error("Slot conflict: the requested slot is no longer available")]
    SlotConflict,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref err) => match err {
                DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                DatabaseError::Duplicate => (StatusCode::CONFLICT, "Resource already exists"),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::InvalidTime(_) => (StatusCode::BAD_REQUEST, "Invalid time"),
            AppError::InvalidRule(_) => (StatusCode::BAD_REQUEST, "Invalid availability rule"),
            AppError::InvalidDuration(_) => (StatusCode::BAD_REQUEST, "Invalid service duration"),
            AppError::SlotConflict => (
                StatusCode::CONFLICT,
                "The requested slot is no longer available",
            ),
            AppError::Forbidden(_) => {
                // Authorization failures are security-relevant and never retryable.
                tracing::warn!(error = %self, "forbidden transition attempt");
                (StatusCode::FORBIDDEN, "Access denied")
            }
            AppError::InvalidTransition(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "This appointment can no longer be changed",
            ),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
