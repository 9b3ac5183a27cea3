//! End-to-end checkout scenarios over the pure core.
//!
//! These walk a cart through pricing, the checkout wizard, and order-item
//! assembly exactly as the route handlers do, without a server or database:
//! everything between HTTP and SQL is deterministic and runs here.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use orchard_core::{CurrencyCode, Money, PaymentMethodId, ProductId};
use orchard_storefront::cart::{Cart, ProductSnapshot};
use orchard_storefront::checkout::{CheckoutDraft, CheckoutEvent, CheckoutStep, ShippingForm};
use orchard_storefront::pricing;
use orchard_storefront::services::orders::{assemble_items, items_subtotal};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn product(name: &str, sku: &str, minor_price: i64, stock: u32) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::generate(),
        name: name.to_owned(),
        sku: sku.to_owned(),
        price: Money::from_minor(minor_price, CurrencyCode::USD),
        stock_quantity: stock,
        image_url: None,
    }
}

fn shipping_form() -> ShippingForm {
    ShippingForm {
        email: "a@b.com".to_owned(),
        first_name: "Grace".to_owned(),
        last_name: "Hopper".to_owned(),
        address: "1 Harbor Lane".to_owned(),
        city: "Arlington".to_owned(),
        postal_code: "22201".to_owned(),
        country: "US".to_owned(),
        phone: "+1 555 0100".to_owned(),
    }
}

#[test]
fn free_shipping_order_above_threshold() {
    // Cart with one line: 29.99 × 2
    let mut cart = Cart::new();
    cart.add(product("Walnut Board", "BRD-11", 2999, 10), 2);

    let totals = pricing::quote(cart.subtotal());
    assert_eq!(totals.subtotal, dec("59.98"));
    assert_eq!(totals.shipping, Decimal::ZERO); // above the 50 threshold
    assert_eq!(totals.tax, dec("5.998"));
    assert_eq!(totals.total, dec("65.978"));
}

#[test]
fn flat_shipping_order_below_threshold() {
    // Cart with one line: 10.00 × 1
    let mut cart = Cart::new();
    cart.add(product("Tea Towel", "TOW-04", 1000, 10), 1);

    let totals = pricing::quote(cart.subtotal());
    assert_eq!(totals.subtotal, dec("10.00"));
    assert_eq!(totals.shipping, dec("4.99"));
    assert_eq!(totals.tax, dec("1.00"));
    assert_eq!(totals.total, dec("15.99"));
}

#[test]
fn full_wizard_walk_to_submittable_draft() {
    let mut cart = Cart::new();
    cart.add(product("Walnut Board", "BRD-11", 2999, 10), 2);
    cart.add(product("Tea Towel", "TOW-04", 1000, 10), 1);

    let mut draft = CheckoutDraft::new();
    assert_eq!(draft.step(), CheckoutStep::Info);

    // Info step: the form must fully validate
    draft
        .apply(CheckoutEvent::SubmitInfo(shipping_form()))
        .unwrap();
    assert_eq!(draft.step(), CheckoutStep::Payment);

    // Detour backward; nothing is lost
    draft.apply(CheckoutEvent::Back).unwrap();
    assert!(draft.shipping().is_some());
    draft
        .apply(CheckoutEvent::SubmitInfo(shipping_form()))
        .unwrap();

    // Payment step
    let method = PaymentMethodId::generate();
    draft.apply(CheckoutEvent::SelectPayment(method)).unwrap();
    assert_eq!(draft.step(), CheckoutStep::Review);

    // Review: the draft hands the order manager its inputs
    let (shipping, selected) = draft.ready_for_submit().unwrap();
    assert_eq!(selected, method);
    assert_eq!(shipping.email.as_str(), "a@b.com");

    // Assembly freezes the cart lines; totals reconcile
    let items = assemble_items(&cart);
    assert_eq!(items.len(), 2);
    for item in &items {
        assert_eq!(
            item.total_price,
            item.unit_price * Decimal::from(item.quantity)
        );
    }
    let totals = pricing::quote(cart.subtotal());
    assert_eq!(items_subtotal(&items), totals.subtotal);

    // The cart is cleared only after a successful submission
    cart.clear();
    assert!(cart.is_empty());
}

#[test]
fn failed_submission_leaves_cart_and_draft_intact() {
    let mut cart = Cart::new();
    cart.add(product("Tea Towel", "TOW-04", 1000, 10), 1);

    let mut draft = CheckoutDraft::new();
    draft
        .apply(CheckoutEvent::SubmitInfo(shipping_form()))
        .unwrap();

    // Submission before review must be rejected, with no side effects
    assert!(draft.ready_for_submit().is_err());
    assert_eq!(draft.step(), CheckoutStep::Payment);
    assert!(!cart.is_empty());
}

#[test]
fn review_is_unreachable_without_payment_selection() {
    let mut draft = CheckoutDraft::new();
    draft
        .apply(CheckoutEvent::SubmitInfo(shipping_form()))
        .unwrap();

    // Whatever we do short of selecting a method, submit stays rejected
    draft.apply(CheckoutEvent::Back).unwrap();
    draft
        .apply(CheckoutEvent::SubmitInfo(shipping_form()))
        .unwrap();
    assert!(draft.ready_for_submit().is_err());
}
