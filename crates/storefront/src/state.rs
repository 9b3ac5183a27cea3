//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::currency::CurrencyBook;
use crate::services::payments::PaymentBridgeClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    payments: PaymentBridgeClient,
    currencies: CurrencyBook,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let payments = PaymentBridgeClient::new(&config.payment_bridge);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                currencies: CurrencyBook::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment bridge client.
    #[must_use]
    pub fn payments(&self) -> &PaymentBridgeClient {
        &self.inner.payments
    }

    /// Get a reference to the cached currency book.
    #[must_use]
    pub fn currencies(&self) -> &CurrencyBook {
        &self.inner.currencies
    }
}
