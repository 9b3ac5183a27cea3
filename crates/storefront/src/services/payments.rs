//! Payment bridge client.
//!
//! The storefront never speaks to Stripe or `PayPal` directly. Two serverless
//! bridge functions own the provider SDKs and credentials; this client posts
//! them a small JSON command and relays the outcome. Capture is decoupled
//! from order creation: [`place_order`](crate::services::orders::place_order)
//! finishes first, then the customer triggers payment against the recorded
//! order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orchard_core::{CurrencyCode, OrderId};

use crate::config::PaymentBridgeConfig;
use crate::models::PaymentProvider;

/// Errors from a bridge call.
#[derive(Debug, Error)]
pub enum PaymentBridgeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bridge answered with an error payload.
    #[error("bridge error: {0}")]
    Bridge(String),

    /// The bridge answered with something unparseable.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Commands a bridge function understands.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAction {
    Create,
    Capture,
    Refund,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BridgeRequest<'a> {
    action: PaymentAction,
    order_id: &'a str,
    amount: Decimal,
    currency: &'a str,
}

#[derive(Deserialize)]
struct BridgeResponse {
    status: Option<String>,
    error: Option<String>,
}

/// The bridge's report of a payment attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub provider: PaymentProvider,
    pub status: String,
}

/// Client for the two payment-bridge endpoints.
#[derive(Clone)]
pub struct PaymentBridgeClient {
    client: reqwest::Client,
    stripe_url: String,
    paypal_url: String,
}

impl PaymentBridgeClient {
    /// Create a new bridge client.
    #[must_use]
    pub fn new(config: &PaymentBridgeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            stripe_url: config.stripe_url.clone(),
            paypal_url: config.paypal_url.clone(),
        }
    }

    /// Send one command to the provider's bridge.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentBridgeError`] if the call fails, the response is
    /// unparseable, or the bridge reports an error.
    pub async fn dispatch(
        &self,
        provider: PaymentProvider,
        action: PaymentAction,
        order_id: OrderId,
        amount: Decimal,
        currency: CurrencyCode,
    ) -> Result<PaymentOutcome, PaymentBridgeError> {
        let url = match provider {
            PaymentProvider::Stripe => &self.stripe_url,
            PaymentProvider::Paypal => &self.paypal_url,
        };

        let order_id = order_id.to_string();
        let body = BridgeRequest {
            action,
            order_id: &order_id,
            amount,
            currency: currency.code(),
        };

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentBridgeError::Bridge(format!(
                "HTTP {status}: {}",
                message.chars().take(200).collect::<String>()
            )));
        }

        let parsed: BridgeResponse = response
            .json()
            .await
            .map_err(|e| PaymentBridgeError::Parse(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(PaymentBridgeError::Bridge(error));
        }

        let status = parsed
            .status
            .ok_or_else(|| PaymentBridgeError::Parse("response had no status".to_owned()))?;

        Ok(PaymentOutcome { provider, status })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_request_wire_shape() {
        let body = BridgeRequest {
            action: PaymentAction::Capture,
            order_id: "7b52009b-3a9b-4f2e-8f37-111111111111",
            amount: "65.978".parse().unwrap(),
            currency: "USD",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["action"], "capture");
        assert_eq!(json["orderId"], "7b52009b-3a9b-4f2e-8f37-111111111111");
        assert_eq!(json["currency"], "USD");
        // Decimal amounts go on the wire as exact strings, not floats
        assert_eq!(json["amount"], "65.978");
    }

    #[test]
    fn test_bridge_response_parses_both_shapes() {
        let ok: BridgeResponse =
            serde_json::from_str(r#"{"status": "captured", "transactionId": "tx_1"}"#).unwrap();
        assert_eq!(ok.status.as_deref(), Some("captured"));
        assert!(ok.error.is_none());

        let err: BridgeResponse = serde_json::from_str(r#"{"error": "card_declined"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("card_declined"));
    }
}
