//! Display currency reads.

use rust_decimal::Decimal;
use sqlx::PgPool;

use orchard_core::CurrencyCode;

use super::RepositoryError;
use crate::models::Currency;

#[derive(sqlx::FromRow)]
struct CurrencyRow {
    code: String,
    symbol: String,
    exchange_rate: Decimal,
    active: bool,
}

impl CurrencyRow {
    fn into_currency(self) -> Result<Currency, RepositoryError> {
        let code: CurrencyCode = self.code.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("unknown currency in database: {e}"))
        })?;

        if self.exchange_rate <= Decimal::ZERO {
            return Err(RepositoryError::DataCorruption(format!(
                "non-positive exchange rate for {code}: {}",
                self.exchange_rate
            )));
        }

        Ok(Currency {
            code,
            symbol: self.symbol,
            exchange_rate: self.exchange_rate,
            active: self.active,
        })
    }
}

/// List active display currencies.
///
/// The base currency is expected to be present with an exchange rate of 1.
///
/// # Errors
///
/// Returns [`RepositoryError`] if the query fails or a row is invalid.
pub async fn list_active(pool: &PgPool) -> Result<Vec<Currency>, RepositoryError> {
    let rows: Vec<CurrencyRow> = sqlx::query_as(
        r"
        SELECT code, symbol, exchange_rate, active
        FROM currencies
        WHERE active
        ORDER BY code
        ",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(CurrencyRow::into_currency).collect()
}
