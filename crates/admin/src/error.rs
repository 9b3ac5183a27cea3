//! Admin error handling.
//!
//! Smaller sibling of the storefront's `AppError`: the back office is an
//! internal tool, so illegal transitions come back verbatim while storage
//! detail still stays out of responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the admin service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested status change is not a legal transition.
    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::IllegalTransition(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        }

        let message = match &self {
            Self::Database(_) => "Internal server error".to_owned(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
