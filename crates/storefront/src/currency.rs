//! Display-currency formatting.
//!
//! Prices are stored in the base currency; customers may browse in any
//! active display currency. Conversion is presentation-only - orders are
//! always priced and persisted in the base currency - so a stale rate can
//! never change what anyone is charged.
//!
//! The active-currency table is read through a `moka` cache (5-minute TTL);
//! a currency that is unknown or inactive falls back to the base.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use sqlx::PgPool;

use orchard_core::{CurrencyCode, Money};

use crate::db::{self, RepositoryError};
use crate::models::Currency;

/// How long the rate book may be served from cache.
const RATE_CACHE_TTL: Duration = Duration::from_secs(300);

type RateBook = Arc<HashMap<CurrencyCode, Currency>>;

/// Convert a base-currency amount for display in `target`.
///
/// Pure; `rate` is the multiplier from base into the target currency.
#[must_use]
pub fn convert(base: Money, target: CurrencyCode, rate: Decimal) -> Money {
    Money::new(base.amount * rate, target)
}

/// Cached reader of the `currencies` table.
#[derive(Clone)]
pub struct CurrencyBook {
    cache: Cache<(), RateBook>,
}

impl CurrencyBook {
    /// Create an empty, unloaded book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(RATE_CACHE_TTL)
                .build(),
        }
    }

    /// List the active currencies, through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the underlying read fails.
    pub async fn active(&self, pool: &PgPool) -> Result<Vec<Currency>, RepositoryError> {
        let book = self.load(pool).await?;
        let mut currencies: Vec<Currency> = book.values().cloned().collect();
        currencies.sort_by_key(|c| c.code.code());
        Ok(currencies)
    }

    /// Format a base-currency amount in the requested display currency.
    ///
    /// Unknown or inactive codes (and a cold, unreachable store) fall back
    /// to base-currency formatting rather than failing a page render.
    pub async fn format(&self, pool: &PgPool, base: Money, display: CurrencyCode) -> String {
        debug_assert_eq!(base.currency, CurrencyCode::BASE);

        if display == CurrencyCode::BASE {
            return base.display();
        }

        match self.load(pool).await {
            Ok(book) => match book.get(&display) {
                Some(currency) => {
                    let converted = convert(base, display, currency.exchange_rate);
                    format!("{}{:.2}", currency.symbol, converted.amount.round_dp(2))
                }
                None => base.display(),
            },
            Err(e) => {
                tracing::warn!("currency table unavailable, showing base prices: {e}");
                base.display()
            }
        }
    }

    async fn load(&self, pool: &PgPool) -> Result<RateBook, RepositoryError> {
        self.cache
            .try_get_with((), async {
                let currencies = db::currencies::list_active(pool).await?;
                let book: HashMap<CurrencyCode, Currency> = currencies
                    .into_iter()
                    .map(|currency| (currency.code, currency))
                    .collect();
                Ok::<_, RepositoryError>(Arc::new(book))
            })
            .await
            .map_err(|e: Arc<RepositoryError>| RepositoryError::Unavailable(e.to_string()))
    }
}

impl Default for CurrencyBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_convert_applies_rate() {
        let base = Money::new(dec("10.00"), CurrencyCode::USD);
        let eur = convert(base, CurrencyCode::EUR, dec("0.92"));
        assert_eq!(eur.amount, dec("9.2000"));
        assert_eq!(eur.currency, CurrencyCode::EUR);
    }

    #[test]
    fn test_convert_identity_rate() {
        let base = Money::new(dec("19.99"), CurrencyCode::USD);
        let same = convert(base, CurrencyCode::USD, Decimal::ONE);
        assert_eq!(same, base);
    }

    #[test]
    fn test_display_rounding_is_bankers() {
        // 10.125 → 10.12, 10.135 → 10.14 under midpoint-nearest-even
        let a = convert(
            Money::new(dec("10.125"), CurrencyCode::USD),
            CurrencyCode::EUR,
            Decimal::ONE,
        );
        assert_eq!(format!("{:.2}", a.amount.round_dp(2)), "10.12");

        let b = convert(
            Money::new(dec("10.135"), CurrencyCode::USD),
            CurrencyCode::EUR,
            Decimal::ONE,
        );
        assert_eq!(format!("{:.2}", b.amount.round_dp(2)), "10.14");
    }
}
