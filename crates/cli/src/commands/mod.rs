//! CLI subcommands.

pub mod migrate;
pub mod seed;

use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Read the database URL the commands operate on.
pub(crate) fn database_url() -> Result<String, CliError> {
    std::env::var("STOREFRONT_DATABASE_URL")
        .map_err(|_| CliError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}
