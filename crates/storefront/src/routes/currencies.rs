//! Display-currency route handlers.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use orchard_core::CurrencyCode;

use crate::error::Result;
use crate::models::Currency;
use crate::state::AppState;

/// Currency display data.
#[derive(Debug, Serialize)]
pub struct CurrencyView {
    pub code: CurrencyCode,
    pub symbol: String,
    pub exchange_rate: Decimal,
    pub is_base: bool,
}

impl From<Currency> for CurrencyView {
    fn from(currency: Currency) -> Self {
        Self {
            is_base: currency.code == CurrencyCode::BASE,
            code: currency.code,
            symbol: currency.symbol,
            exchange_rate: currency.exchange_rate,
        }
    }
}

/// List the active display currencies.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CurrencyView>>> {
    let currencies = state.currencies().active(state.pool()).await?;
    Ok(Json(currencies.into_iter().map(Into::into).collect()))
}
