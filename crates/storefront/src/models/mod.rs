//! Domain models backing the storefront.
//!
//! Row-level concerns (status text, raw currency codes) are converted at the
//! repository boundary; everything above it works with these types.

pub mod session;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::{
    CategoryId, CurrencyCode, CustomerId, Email, Money, OrderId, OrderNumber, OrderStatus,
    PaymentMethodId, PaymentStatus, ProductId,
};

/// A sellable product as read from the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: u32,
    pub category_id: Option<CategoryId>,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer record, found or created at order submission.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted order header.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method_id: PaymentMethodId,
    pub currency: CurrencyCode,
    pub subtotal: Decimal,
    pub shipping_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The shipping address snapshot persisted with an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingAddress {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

/// Everything the order manager needs to persist one order.
///
/// Totals are computed by the pricing calculator immediately before this is
/// built; the order number is drawn from the database sequence at insert time.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub payment_method_id: PaymentMethodId,
    pub currency: CurrencyCode,
    pub subtotal: Decimal,
    pub shipping_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItemDraft>,
}

/// One not-yet-persisted order line, snapshotted from a cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub total_price: Decimal,
}

/// A way to pay, loaded from the store's `payment_methods` table.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub code: String,
    pub name: String,
    pub provider: PaymentProvider,
    pub active: bool,
}

/// Which bridge endpoint a payment method settles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    Stripe,
    Paypal,
}

impl PaymentProvider {
    /// Stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Paypal => "paypal",
        }
    }
}

impl std::str::FromStr for PaymentProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stripe" => Ok(Self::Stripe),
            "paypal" => Ok(Self::Paypal),
            other => Err(format!("unknown payment provider: {other}")),
        }
    }
}

/// An active display currency with its exchange rate against the base.
#[derive(Debug, Clone, Serialize)]
pub struct Currency {
    pub code: CurrencyCode,
    pub symbol: String,
    /// Multiplier from the base currency into this one.
    pub exchange_rate: Decimal,
    pub active: bool,
}
