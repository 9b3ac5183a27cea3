//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Checkout-specific failures carry enough structure for the client to stay
//! on the current step with field-level messages (never a crash, never a
//! half-lost form).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::checkout::{CheckoutError, FieldErrors};
use crate::db::RepositoryError;
use crate::services::orders::PlaceOrderError;
use crate::services::payments::PaymentBridgeError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// A checkout step transition was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order placement failed.
    #[error("Order error: {0}")]
    Order(#[from] PlaceOrderError),

    /// Payment bridge call failed.
    #[error("Payment bridge error: {0}")]
    PaymentBridge(#[from] PaymentBridgeError),

    /// Session read/write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl AppError {
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) | Self::PaymentBridge(_)
        ) || matches!(self, Self::Order(e) if e.is_infrastructure())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::PaymentBridge(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(e) => match e {
                CheckoutError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::CONFLICT,
            },
            Self::Order(e) => {
                if e.is_infrastructure() {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal detail stays in the logs.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
            Self::PaymentBridge(_) => "Payment service is unavailable, try again".to_owned(),
            Self::Order(e) => {
                if e.is_infrastructure() {
                    // Retryable by resubmitting; the draft is untouched
                    "Could not place order, try again".to_owned()
                } else {
                    e.to_string()
                }
            }
            Self::Checkout(e) => e.to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        }
    }

    fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Checkout(CheckoutError::Invalid(fields)) => Some(fields.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.message(),
            fields: self.field_errors(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_owned());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_owned());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".to_owned()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("x".to_owned()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Checkout(CheckoutError::EmptyCart).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let err = AppError::Internal("connection string leaked?".to_owned());
        assert_eq!(err.message(), "Internal server error");
    }
}
