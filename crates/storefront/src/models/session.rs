//! Session-stored state.
//!
//! The cart aggregate and the in-progress checkout draft live in the
//! `PostgreSQL`-backed session record, not in process memory; a storefront
//! instance holds no per-visitor state.

use serde::{Deserialize, Serialize};

use orchard_core::{OrderId, OrderNumber};

/// Session keys for storefront data.
pub mod keys {
    /// Key for the shopping cart aggregate.
    pub const CART: &str = "cart";

    /// Key for the in-progress checkout draft.
    pub const CHECKOUT_DRAFT: &str = "checkout_draft";

    /// Key for the most recently placed order (confirmation + payment step).
    pub const LAST_ORDER: &str = "last_order";
}

/// Minimal record of a just-placed order, kept in the session so the
/// confirmation view and the decoupled payment capture can find it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrderRef {
    /// Database ID of the order.
    pub order_id: OrderId,
    /// Human-facing order number shown to the customer.
    pub order_number: OrderNumber,
}
