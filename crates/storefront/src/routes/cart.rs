//! Cart route handlers.
//!
//! Every handler follows the same shape: load the cart from the session,
//! mutate the aggregate, save it back, and return the freshly priced view.
//! Totals come from the pricing calculator on every render; the cart itself
//! never stores a derived number.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use orchard_core::{CurrencyCode, Money, ProductId};

use crate::cart::{self, Cart, ProductSnapshot};
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::pricing;
use crate::routes::DisplayCurrency;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image_url: Option<String>,
}

/// Cart display data with derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total_items: u32,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

/// Price a cart for display in the requested currency.
pub async fn build_cart_view(state: &AppState, cart: &Cart, display: &DisplayCurrency) -> CartView {
    let code = display.code();
    let book = state.currencies();
    let pool = state.pool();

    let mut items = Vec::with_capacity(cart.lines().len());
    for line in cart.lines() {
        items.push(CartItemView {
            product_id: line.product.id,
            name: line.product.name.clone(),
            sku: line.product.sku.clone(),
            quantity: line.quantity,
            unit_price: book.format(pool, line.product.price, code).await,
            line_total: book.format(pool, line.line_total(), code).await,
            image_url: line.product.image_url.clone(),
        });
    }

    let totals = pricing::quote(cart.subtotal());
    let base = CurrencyCode::BASE;

    CartView {
        items,
        total_items: cart.total_items(),
        subtotal: book.format(pool, Money::new(totals.subtotal, base), code).await,
        shipping: book.format(pool, Money::new(totals.shipping, base), code).await,
        tax: book.format(pool, Money::new(totals.tax, base), code).await,
        total: book.format(pool, Money::new(totals.total, base), code).await,
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Display the cart.
#[instrument(skip(state, session, display))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(display): Query<DisplayCurrency>,
) -> Result<Json<CartView>> {
    let cart = cart::load(&session).await?;
    Ok(Json(build_cart_view(&state, &cart, &display).await))
}

/// Add an item to the cart.
///
/// Adding a product already in the cart increments its line; the quantity is
/// clamped to the product's stock.
#[instrument(skip(state, session, display))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Query(display): Query<DisplayCurrency>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = ProductRepository::new(state.pool())
        .get(request.product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;

    if product.stock_quantity == 0 {
        return Err(AppError::BadRequest("product is out of stock".to_owned()));
    }

    let mut cart = cart::load(&session).await?;
    cart.add(ProductSnapshot::from(&product), request.quantity.unwrap_or(1));
    cart::save(&session, &cart).await?;

    Ok(Json(build_cart_view(&state, &cart, &display).await))
}

/// Set a line's quantity; zero removes the line.
#[instrument(skip(state, session, display))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Query(display): Query<DisplayCurrency>,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = cart::load(&session).await?;
    cart.set_quantity(request.product_id, request.quantity);
    cart::save(&session, &cart).await?;

    Ok(Json(build_cart_view(&state, &cart, &display).await))
}

/// Remove a line. Removing an absent product is a no-op.
#[instrument(skip(state, session, display))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Query(display): Query<DisplayCurrency>,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = cart::load(&session).await?;
    cart.remove(request.product_id);
    cart::save(&session, &cart).await?;

    Ok(Json(build_cart_view(&state, &cart, &display).await))
}
