//! Database migration command.
//!
//! Migration files live in `crates/storefront/migrations/` and are embedded
//! into this binary at compile time, so the deployed CLI needs no source
//! checkout to run them.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;

use super::CliError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns [`CliError`] if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
