//! Order management handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use orchard_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::orders::{OrderDetail, OrderRepository, OrderSummary, TransitionOutcome};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Orders list row.
#[derive(Debug, Serialize)]
pub struct OrderSummaryView {
    pub id: OrderId,
    pub order_number: String,
    pub customer_email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub currency: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderSummary> for OrderSummaryView {
    fn from(summary: OrderSummary) -> Self {
        Self {
            id: summary.id,
            order_number: summary.order_number,
            customer_email: summary.customer_email,
            status: summary.status,
            payment_status: summary.payment_status,
            currency: summary.currency,
            total_amount: summary.total_amount,
            created_at: summary.created_at,
        }
    }
}

/// Order item row for the detail view.
#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub total_price: Decimal,
}

/// Full order detail.
#[derive(Debug, Serialize)]
pub struct OrderDetailView {
    #[serde(flatten)]
    pub summary: OrderSummaryView,
    pub subtotal: Decimal,
    pub shipping_amount: Decimal,
    pub tax_amount: Decimal,
    pub shipping_address: serde_json::Value,
    pub items: Vec<OrderItemView>,
}

impl From<OrderDetail> for OrderDetailView {
    fn from(detail: OrderDetail) -> Self {
        Self {
            summary: detail.summary.into(),
            subtotal: detail.subtotal,
            shipping_amount: detail.shipping_amount,
            tax_amount: detail.tax_amount,
            shipping_address: detail.shipping_address,
            items: detail
                .items
                .into_iter()
                .map(|item| OrderItemView {
                    product_id: item.product_id,
                    name: item.name,
                    sku: item.sku,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    total_price: item.total_price,
                })
                .collect(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// A page of orders.
#[derive(Debug, Serialize)]
pub struct OrderListView {
    pub orders: Vec<OrderSummaryView>,
    pub total: i64,
    pub page: u32,
}

/// List orders, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<OrderListView>> {
    let page = params.page.unwrap_or(1).max(1);
    let (orders, total) = OrderRepository::new(state.pool())
        .list(page, params.per_page.unwrap_or(25))
        .await?;

    Ok(Json(OrderListView {
        orders: orders.into_iter().map(Into::into).collect(),
        total,
        page,
    }))
}

/// Show one order with its items.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailView>> {
    let detail = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(detail.into()))
}

/// Status update request.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Payment-status update request.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// Outcome of a transition request.
#[derive(Debug, Serialize)]
pub struct TransitionView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Apply an administrative status transition.
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<TransitionView>> {
    let repo = OrderRepository::new(state.pool());

    let outcome = repo
        .update_status(id, request.status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    match outcome {
        TransitionOutcome::Applied => {
            let detail = repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
            tracing::info!(order = %detail.summary.order_number, status = %request.status, "order status updated");
            Ok(Json(TransitionView {
                id,
                status: detail.summary.status,
                payment_status: detail.summary.payment_status,
            }))
        }
        TransitionOutcome::Illegal { from_order, .. } => Err(AppError::IllegalTransition(format!(
            "cannot move order from {from_order} to {}",
            request.status
        ))),
    }
}

/// Apply a payment-status transition.
#[instrument(skip(state))]
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<TransitionView>> {
    let repo = OrderRepository::new(state.pool());

    let outcome = repo
        .update_payment_status(id, request.payment_status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    match outcome {
        TransitionOutcome::Applied => {
            let detail = repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
            Ok(Json(TransitionView {
                id,
                status: detail.summary.status,
                payment_status: detail.summary.payment_status,
            }))
        }
        TransitionOutcome::Illegal { from_payment, .. } => {
            Err(AppError::IllegalTransition(format!(
                "cannot move payment from {from_payment} to {}",
                request.payment_status
            )))
        }
    }
}
