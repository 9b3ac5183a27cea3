//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::routes::DisplayCurrency;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    /// Price formatted in the requested display currency.
    pub price: String,
    pub stock_quantity: u32,
    pub in_stock: bool,
    pub image_url: Option<String>,
}

impl ProductView {
    async fn build(state: &AppState, product: Product, display: &DisplayCurrency) -> Self {
        let price = state
            .currencies()
            .format(state.pool(), product.price, display.code())
            .await;

        Self {
            id: product.id,
            sku: product.sku,
            name: product.name,
            description: product.description,
            price,
            stock_quantity: product.stock_quantity,
            in_stock: product.stock_quantity > 0,
            image_url: product.image_url,
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub currency: Option<String>,
}

/// A page of products.
#[derive(Debug, Serialize)]
pub struct ProductListView {
    pub products: Vec<ProductView>,
    pub total: i64,
    pub page: u32,
}

/// List active products, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductListView>> {
    let page = ProductRepository::new(state.pool())
        .list_active(params.page.unwrap_or(1), params.per_page.unwrap_or(20))
        .await?;
    let display = DisplayCurrency {
        currency: params.currency,
    };

    let mut products = Vec::with_capacity(page.products.len());
    for product in page.products {
        products.push(ProductView::build(&state, product, &display).await);
    }

    Ok(Json(ProductListView {
        products,
        total: page.total,
        page: page.page,
    }))
}

/// Show one product.
#[instrument(skip(state, display))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(display): Query<DisplayCurrency>,
) -> Result<Json<ProductView>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductView::build(&state, product, &display).await))
}
