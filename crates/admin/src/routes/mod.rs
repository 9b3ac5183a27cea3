//! HTTP route handlers for the admin JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /orders                       - Paginated orders, newest first
//! GET  /orders/{id}                  - Order header + items
//! POST /orders/{id}/status           - Administrative status transition
//! POST /orders/{id}/payment-status   - Payment-status transition (bridge callbacks)
//! ```

pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the admin service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route(
            "/orders/{id}/payment-status",
            post(orders::update_payment_status),
        )
}
