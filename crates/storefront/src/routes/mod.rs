//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - DB readiness check
//!
//! # Products
//! GET  /products                    - Paginated active products
//! GET  /products/{id}               - Product detail
//!
//! # Cart
//! GET  /cart                        - Cart with derived totals
//! POST /cart/add                    - Add a product (increments existing line)
//! POST /cart/update                 - Set a line quantity (0 removes)
//! POST /cart/remove                 - Remove a line
//!
//! # Checkout
//! GET  /checkout                    - Current draft state
//! POST /checkout/info               - Submit shipping info (info → payment)
//! POST /checkout/payment            - Select payment method (payment → review)
//! POST /checkout/back               - One step backward, lossless
//! POST /checkout/submit             - Place the order; clears the cart
//! POST /checkout/pay                - Trigger the payment bridge afterwards
//! GET  /checkout/payment-methods    - Active payment methods
//!
//! # Currencies
//! GET  /currencies                  - Active display currencies
//! ```
//!
//! Prices in responses are formatted in the display currency selected with
//! the `?currency=` query parameter (defaulting to the base currency).

pub mod cart;
pub mod checkout;
pub mod currencies;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use orchard_core::CurrencyCode;

use crate::state::AppState;

/// Query parameter selecting the display currency.
///
/// Unknown codes fall back to the base currency rather than failing the
/// request; conversion is presentation-only.
#[derive(Debug, Default, Deserialize)]
pub struct DisplayCurrency {
    pub currency: Option<String>,
}

impl DisplayCurrency {
    /// The selected currency, or the base.
    #[must_use]
    pub fn code(&self) -> CurrencyCode {
        self.currency
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(CurrencyCode::BASE)
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/info", post(checkout::submit_info))
        .route("/payment", post(checkout::select_payment))
        .route("/back", post(checkout::back))
        .route("/submit", post(checkout::submit))
        .route("/pay", post(checkout::pay))
        .route("/payment-methods", get(checkout::payment_methods))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/currencies", get(currencies::index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_currency_fallback() {
        let none = DisplayCurrency { currency: None };
        assert_eq!(none.code(), CurrencyCode::BASE);

        let bad = DisplayCurrency {
            currency: Some("ZZZ".to_owned()),
        };
        assert_eq!(bad.code(), CurrencyCode::BASE);

        let eur = DisplayCurrency {
            currency: Some("eur".to_owned()),
        };
        assert_eq!(eur.code(), CurrencyCode::EUR);
    }
}
