//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `PAYMENT_BRIDGE_STRIPE_URL` - Stripe bridge endpoint
//! - `PAYMENT_BRIDGE_PAYPAL_URL` - `PayPal` bridge endpoint
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Payment bridge endpoints
    pub payment_bridge: PaymentBridgeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Endpoints of the two serverless payment-bridge functions.
///
/// The storefront never talks to a payment provider directly; it posts
/// `{action, orderId, amount, currency}` to one of these.
#[derive(Debug, Clone)]
pub struct PaymentBridgeConfig {
    /// Stripe bridge endpoint.
    pub stripe_url: String,
    /// `PayPal` bridge endpoint.
    pub paypal_url: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or invalid,
    /// or if the session secret fails the security checks.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("STOREFRONT_DATABASE_URL")?;
        let base_url = required("STOREFRONT_BASE_URL")?;
        let session_secret = required("STOREFRONT_SESSION_SECRET")?;
        validate_secret("STOREFRONT_SESSION_SECRET", &session_secret)?;

        let host: IpAddr = optional("STOREFRONT_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_owned(), format!("{e}"))
            })?;
        let port: u16 = optional("STOREFRONT_PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_owned(), format!("{e}"))
            })?;

        let payment_bridge = PaymentBridgeConfig {
            stripe_url: required("PAYMENT_BRIDGE_STRIPE_URL")?,
            paypal_url: required("PAYMENT_BRIDGE_PAYPAL_URL")?,
        };

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            base_url,
            session_secret: SecretString::from(session_secret),
            payment_bridge,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_rate(name: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = optional(name) else {
        return Ok(default);
    };
    let rate: f32 = raw
        .parse()
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_owned(), format!("{e}")))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            name.to_owned(),
            "must be between 0.0 and 1.0".to_owned(),
        ));
    }
    Ok(rate)
}

/// Reject short, low-entropy, or placeholder-looking secrets.
fn validate_secret(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_owned(),
            format!("must be at least {MIN_SESSION_SECRET_LENGTH} characters"),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_owned(),
                format!("looks like a placeholder (contains \"{pattern}\")"),
            ));
        }
    }

    if shannon_entropy_per_char(value) < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            name.to_owned(),
            "entropy too low; generate it with a CSPRNG".to_owned(),
        ));
    }

    Ok(())
}

/// Shannon entropy in bits per character.
fn shannon_entropy_per_char(value: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in value.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = value.chars().count() as f64;
    if len == 0.0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_rejects_short() {
        assert!(matches!(
            validate_secret("TEST", "short"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_secret_rejects_placeholders() {
        assert!(matches!(
            validate_secret("TEST", "your-session-secret-goes-right-here!"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        assert!(matches!(
            validate_secret("TEST", "changemechangemechangemechangeme1234"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_secret_rejects_low_entropy() {
        assert!(matches!(
            validate_secret("TEST", &"a".repeat(64)),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_secret_accepts_random() {
        assert!(validate_secret("TEST", "kJ8#mP2$vL9@qR4!wN7%xT3^zB6&cF1*").is_ok());
    }

    #[test]
    fn test_parse_rate_bounds() {
        // No env var set for this name, default applies
        assert!((parse_rate("NOT_A_REAL_RATE_VAR", 0.5).unwrap() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_entropy_monotonic() {
        assert!(shannon_entropy_per_char("aaaa") < shannon_entropy_per_char("abcd"));
    }
}
