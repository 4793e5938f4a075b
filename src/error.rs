use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors, mapped to status + `{"error": message}` JSON
/// at the HTTP boundary. Quote-provider failures never appear here; the
/// quote client absorbs them and the aggregator substitutes fallback prices.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid token or logout failed")]
    InvalidToken,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Stock not found")]
    StockNotFound,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UsernameTaken => {
                (StatusCode::BAD_REQUEST, "Username already exists".into())
            }
            AppError::InvalidToken => (
                StatusCode::BAD_REQUEST,
                "Invalid token or logout failed".into(),
            ),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Authentication required".into())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
            }
            AppError::StockNotFound => (StatusCode::NOT_FOUND, "Stock not found".into()),
            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".into())
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
