//! Database operations for the storefront `PostgreSQL` store.
//!
//! # Tables
//!
//! - `products` / `categories` - catalog read model
//! - `customers` - created or found at order submission
//! - `orders` / `order_items` - written once by the order manager
//! - `payment_methods` - active ways to pay
//! - `currencies` - display currencies and exchange rates
//! - `tower_sessions.session` - session store (managed by tower-sessions)
//!
//! Queries are runtime-checked (`sqlx::query_as` with explicit row types) so
//! the workspace builds without a live database.
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p orchard-cli -- migrate
//! ```

pub mod currencies;
pub mod customers;
pub mod orders;
pub mod payment_methods;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be interpreted (bad status text, invalid
    /// email, unknown currency). Indicates outside writes or a schema drift.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A shared/cached read failed upstream of this caller.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
