//! Database operations for the admin service.
//!
//! The back office reads and updates the same `orders` / `order_items`
//! tables the storefront writes. It never creates orders and never touches
//! carts or sessions.

pub mod orders;

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

    /// A stored value could not be interpreted.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
