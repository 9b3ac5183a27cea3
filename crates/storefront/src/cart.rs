//! The shopping cart aggregate.
//!
//! A cart is an ordered list of lines, unique by product. It is session-scoped:
//! loaded from and saved to the tower-sessions record around every mutation,
//! never held in process state. Quantities are clamped to available stock at
//! the time the snapshot was taken; the order manager re-reads nothing from
//! the catalog, it freezes exactly what the cart holds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use orchard_core::{Money, ProductId};

use crate::models::{Product, session::keys};

/// The product data a cart line snapshots when it is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: Money,
    pub stock_quantity: u32,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            price: product.price,
            stock_quantity: product.stock_quantity,
            image_url: product.image_url.clone(),
        }
    }
}

/// One product + quantity entry.
///
/// Invariant: `quantity` is in `[1, product.stock_quantity]`. A line that
/// would drop to zero is removed from the cart instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartLine {
    /// Line total: unit price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product
            .price
            .checked_mul(self.quantity)
            .unwrap_or_else(|_| Money::zero(self.product.price.currency))
    }
}

/// The session-scoped cart aggregate.
///
/// Single-writer within one session; there is no cross-session sharing and
/// nothing to lock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add a product. If it is already in the cart the existing line's
    /// quantity is incremented; a second line is never created. The resulting
    /// quantity is clamped to `[1, stock]`.
    pub fn add(&mut self, product: ProductSnapshot, quantity: u32) {
        let stock = product.stock_quantity;
        if stock == 0 {
            return;
        }

        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(quantity).clamp(1, stock);
            // Newer snapshot wins; the customer just looked at this product
            line.product = product;
        } else {
            self.lines.push(CartLine {
                quantity: quantity.clamp(1, stock),
                product,
            });
        }
    }

    /// Set a line's quantity. Zero (or less, at the API boundary) removes the
    /// line; anything else is clamped to `[1, stock]`. Unknown products are
    /// ignored.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity.clamp(1, line.product.stock_quantity);
        }
    }

    /// Remove a line unconditionally. Removing an absent product is a no-op.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product.id != product_id);
    }

    /// Empty the cart. Called exactly once, after a successful order
    /// submission.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of line totals, in the base currency.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.line_total().amount)
            .sum()
    }

    /// Is the cart empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }
}

// =============================================================================
// Session persistence
// =============================================================================

/// Load the cart from the session; a missing cart is an empty one.
///
/// # Errors
///
/// Returns the session store's error if the read fails.
pub async fn load(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Save the cart back to the session.
///
/// # Errors
///
/// Returns the session store's error if the write fails.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orchard_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;

    fn snapshot(stock: u32, minor_price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::generate(),
            name: "Ceramic Mug".to_owned(),
            sku: "MUG-01".to_owned(),
            price: Money::from_minor(minor_price, CurrencyCode::USD),
            stock_quantity: stock,
            image_url: None,
        }
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = Cart::new();
        cart.add(snapshot(10, 2999), 2);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_add_same_product_increments_not_duplicates() {
        let mut cart = Cart::new();
        let product = snapshot(10, 2999);

        cart.add(product.clone(), 1);
        cart.add(product, 2);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let mut cart = Cart::new();
        let product = snapshot(3, 2999);

        cart.add(product.clone(), 2);
        cart.add(product, 5);

        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_add_out_of_stock_is_ignored() {
        let mut cart = Cart::new();
        cart.add(snapshot(0, 2999), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_zero_quantity_becomes_one() {
        let mut cart = Cart::new();
        cart.add(snapshot(5, 2999), 0);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        let product = snapshot(10, 2999);
        let id = product.id;

        cart.add(product, 1);
        cart.set_quantity(id, 4);
        assert_eq!(cart.total_items(), 4);

        // Clamped to stock
        cart.set_quantity(id, 99);
        assert_eq!(cart.total_items(), 10);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        let product = snapshot(10, 2999);
        let id = product.id;

        cart.add(product, 2);
        cart.set_quantity(id, 0);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        let product = snapshot(10, 2999);
        let id = product.id;

        cart.add(product, 2);
        cart.remove(id);
        assert!(cart.is_empty());

        // Removing again is a no-op
        cart.remove(id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::new();
        cart.add(snapshot(10, 2999), 2); // 59.98
        cart.add(snapshot(10, 1000), 1); // 10.00

        assert_eq!(cart.subtotal(), Decimal::new(6998, 2));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(snapshot(10, 2999), 2);
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }
}
