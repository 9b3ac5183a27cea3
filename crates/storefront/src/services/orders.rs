//! The order manager.
//!
//! [`place_order`] turns the live cart + validated checkout draft into a
//! persisted customer / order / order-items graph. The whole write runs in
//! one database transaction: there is no state in which a header exists
//! without its items. Totals are recomputed here from the current cart via
//! the pricing calculator - a total cached anywhere else is never trusted.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use orchard_core::{CurrencyCode, OrderId, OrderNumber, PaymentMethodId};

use crate::cart::Cart;
use crate::db::{self, RepositoryError};
use crate::models::{NewOrder, OrderItemDraft, ShippingAddress};
use crate::pricing::{self, Totals};

/// Errors from order placement.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The cart had no lines.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// The selected payment method no longer exists or was deactivated.
    #[error("the selected payment method is no longer available")]
    PaymentMethodUnavailable,

    /// The store rejected part of the write; everything was rolled back.
    #[error("storage failure: {0}")]
    Repository(#[from] RepositoryError),
}

impl PlaceOrderError {
    /// Infrastructure failures are retryable verbatim; the others need the
    /// customer to change something first.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Repository(_))
    }
}

/// The successful outcome of a placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub totals: Totals,
}

/// Snapshot the cart into order-item drafts.
///
/// Pure; the persistence layer stores exactly these rows. Each draft's
/// `total_price` is `unit_price × quantity` and the drafts' totals sum to
/// the cart subtotal.
#[must_use]
pub fn assemble_items(cart: &Cart) -> Vec<OrderItemDraft> {
    cart.lines()
        .iter()
        .map(|line| OrderItemDraft {
            product_id: line.product.id,
            name: line.product.name.clone(),
            sku: line.product.sku.clone(),
            unit_price: line.product.price.amount,
            quantity: line.quantity,
            total_price: line.line_total().amount,
        })
        .collect()
}

/// Assemble and persist an order from the current cart contents.
///
/// Steps, logically and physically one transaction:
/// 1. re-validate the payment method against the store
/// 2. find or create the customer from the shipping info
/// 3. recompute subtotal/shipping/tax/total from the cart
/// 4. draw an order number and insert the header (`pending`/`pending`)
/// 5. insert one frozen item row per cart line
///
/// The caller clears the cart only after this returns `Ok`.
///
/// # Errors
///
/// Returns [`PlaceOrderError`]; on any failure the transaction is rolled
/// back and nothing was written.
#[instrument(skip(pool, cart, shipping), fields(items = cart.lines().len()))]
pub async fn place_order(
    pool: &PgPool,
    cart: &Cart,
    shipping: &ShippingAddress,
    payment_method_id: PaymentMethodId,
    currency: CurrencyCode,
) -> Result<PlacedOrder, PlaceOrderError> {
    if cart.is_empty() {
        return Err(PlaceOrderError::EmptyCart);
    }

    db::payment_methods::get_active(pool, payment_method_id)
        .await?
        .ok_or(PlaceOrderError::PaymentMethodUnavailable)?;

    let totals = pricing::quote(cart.subtotal());
    let items = assemble_items(cart);

    let mut tx = pool.begin().await.map_err(RepositoryError::from)?;

    let customer = db::customers::find_or_create(&mut tx, shipping).await?;

    let new_order = NewOrder {
        customer_id: customer.id,
        payment_method_id,
        currency,
        subtotal: totals.subtotal,
        shipping_amount: totals.shipping,
        tax_amount: totals.tax,
        total_amount: totals.total,
        shipping_address: shipping.clone(),
        items,
    };
    let (order_id, order_number) = db::orders::place(&mut tx, &new_order).await?;

    tx.commit().await.map_err(RepositoryError::from)?;

    tracing::info!(%order_number, customer = %customer.id, "order placed");

    Ok(PlacedOrder {
        order_id,
        order_number,
        totals,
    })
}

/// Sum of the drafts' line totals; must equal the order subtotal.
#[must_use]
pub fn items_subtotal(items: &[OrderItemDraft]) -> Decimal {
    items.iter().map(|item| item.total_price).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orchard_core::{Money, ProductId};

    use super::*;
    use crate::cart::ProductSnapshot;

    fn snapshot(name: &str, sku: &str, minor_price: i64, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::generate(),
            name: name.to_owned(),
            sku: sku.to_owned(),
            price: Money::from_minor(minor_price, CurrencyCode::USD),
            stock_quantity: stock,
            image_url: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_assemble_items_freezes_each_line() {
        let mut cart = Cart::new();
        cart.add(snapshot("Ceramic Mug", "MUG-01", 2999, 10), 2);
        cart.add(snapshot("Tea Towel", "TOW-04", 1000, 10), 1);

        let items = assemble_items(&cart);

        assert_eq!(items.len(), 2);
        for item in &items {
            assert_eq!(
                item.total_price,
                item.unit_price * Decimal::from(item.quantity)
            );
        }
    }

    #[test]
    fn test_assembled_items_sum_to_cart_subtotal() {
        let mut cart = Cart::new();
        cart.add(snapshot("Ceramic Mug", "MUG-01", 2999, 10), 2);
        cart.add(snapshot("Tea Towel", "TOW-04", 1000, 10), 3);

        let items = assemble_items(&cart);

        assert_eq!(items_subtotal(&items), cart.subtotal());
        // And the order's persisted subtotal comes from the same number
        assert_eq!(pricing::quote(cart.subtotal()).subtotal, cart.subtotal());
    }

    #[test]
    fn test_assemble_keeps_name_and_sku_snapshots() {
        let mut cart = Cart::new();
        let product = snapshot("Ceramic Mug", "MUG-01", 2999, 10);
        cart.add(product, 2);

        let items = assemble_items(&cart);
        let item = items.first().unwrap();
        assert_eq!(item.name, "Ceramic Mug");
        assert_eq!(item.sku, "MUG-01");
        assert_eq!(item.unit_price, dec("29.99"));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.total_price, dec("59.98"));
    }

    #[test]
    fn test_empty_cart_assembles_nothing() {
        assert!(assemble_items(&Cart::new()).is_empty());
        assert_eq!(items_subtotal(&[]), Decimal::ZERO);
    }
}
