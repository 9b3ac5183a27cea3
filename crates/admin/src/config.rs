//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (same store the
//!   storefront writes to)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("ADMIN_DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("ADMIN_DATABASE_URL".to_owned()))?;

        let host: IpAddr = std::env::var("ADMIN_HOST")
            .unwrap_or_else(|_| "127.0.0.1".to_owned())
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_owned(), format!("{e}")))?;

        let port: u16 = std::env::var("ADMIN_PORT")
            .unwrap_or_else(|_| "3001".to_owned())
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_owned(), format!("{e}")))?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
