//! Order reads and administrative updates.
//!
//! Status changes lock the order row (`FOR UPDATE`) and check legality
//! against the current stored value inside the same transaction, so two
//! concurrent operators cannot race an order into an illegal state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use orchard_core::{OrderId, OrderStatus, PaymentStatus};

use super::RepositoryError;

/// One row of the orders list.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub customer_email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub currency: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// An order's frozen line item.
#[derive(Debug, Clone)]
pub struct OrderItemDetail {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub total_price: Decimal,
}

/// A full order for the detail view.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub summary: OrderSummary,
    pub subtotal: Decimal,
    pub shipping_amount: Decimal,
    pub tax_amount: Decimal,
    pub shipping_address: serde_json::Value,
    pub items: Vec<OrderItemDetail>,
}

/// The result of a status update attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// The stored status does not allow this move.
    Illegal {
        from_order: OrderStatus,
        from_payment: PaymentStatus,
    },
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    order_number: String,
    customer_email: String,
    status: String,
    payment_status: String,
    currency: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
}

impl SummaryRow {
    fn into_summary(self) -> Result<OrderSummary, RepositoryError> {
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", self.order_number))
        })?;
        let payment_status: PaymentStatus = self.payment_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", self.order_number))
        })?;

        Ok(OrderSummary {
            id: OrderId::from_uuid(self.id),
            order_number: self.order_number,
            customer_email: self.customer_email,
            status,
            payment_status,
            currency: self.currency,
            total_amount: self.total_amount,
            created_at: self.created_at,
        })
    }
}

/// Repository for order management.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if a query fails or a row is invalid.
    pub async fn list(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<OrderSummary>, i64), RepositoryError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let rows: Vec<SummaryRow> = sqlx::query_as(
            r"
            SELECT o.id, o.order_number, c.email AS customer_email, o.status,
                   o.payment_status, o.currency, o.total_amount, o.created_at
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            ORDER BY o.created_at DESC, o.id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let summaries = rows
            .into_iter()
            .map(SummaryRow::into_summary)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((summaries, total))
    }

    /// Fetch one order with its items.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if a query fails or a row is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct DetailRow {
            id: Uuid,
            order_number: String,
            customer_email: String,
            status: String,
            payment_status: String,
            currency: String,
            subtotal: Decimal,
            shipping_amount: Decimal,
            tax_amount: Decimal,
            total_amount: Decimal,
            shipping_address: serde_json::Value,
            created_at: DateTime<Utc>,
        }

        let row: Option<DetailRow> = sqlx::query_as(
            r"
            SELECT o.id, o.order_number, c.email AS customer_email, o.status,
                   o.payment_status, o.currency, o.subtotal, o.shipping_amount,
                   o.tax_amount, o.total_amount, o.shipping_address, o.created_at
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let summary = SummaryRow {
            id: row.id,
            order_number: row.order_number,
            customer_email: row.customer_email,
            status: row.status,
            payment_status: row.payment_status,
            currency: row.currency,
            total_amount: row.total_amount,
            created_at: row.created_at,
        }
        .into_summary()?;

        #[derive(sqlx::FromRow)]
        struct ItemRow {
            product_id: Uuid,
            name: String,
            sku: String,
            unit_price: Decimal,
            quantity: i64,
            total_price: Decimal,
        }

        let items: Vec<ItemRow> = sqlx::query_as(
            r"
            SELECT product_id, name, sku, unit_price, quantity, total_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY name, id
            ",
        )
        .bind(id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            summary,
            subtotal: row.subtotal,
            shipping_amount: row.shipping_amount,
            tax_amount: row.tax_amount,
            shipping_address: row.shipping_address,
            items: items
                .into_iter()
                .map(|item| OrderItemDetail {
                    product_id: item.product_id,
                    name: item.name,
                    sku: item.sku,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    total_price: item.total_price,
                })
                .collect(),
        }))
    }

    /// Apply an administrative fulfillment-status transition.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if a query fails; an illegal move is a
    /// normal [`TransitionOutcome::Illegal`], not an error.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Option<TransitionOutcome>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String, String)> =
            sqlx::query_as("SELECT status, payment_status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

        let Some((status_raw, payment_raw)) = row else {
            return Ok(None);
        };
        let current: OrderStatus = status_raw
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {id}: {e}")))?;
        let payment: PaymentStatus = payment_raw
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {id}: {e}")))?;

        if !current.can_transition_to(next) {
            return Ok(Some(TransitionOutcome::Illegal {
                from_order: current,
                from_payment: payment,
            }));
        }

        sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(next.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(TransitionOutcome::Applied))
    }

    /// Apply a payment-status transition (bridge callbacks land here).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if a query fails.
    pub async fn update_payment_status(
        &self,
        id: OrderId,
        next: PaymentStatus,
    ) -> Result<Option<TransitionOutcome>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String, String)> =
            sqlx::query_as("SELECT status, payment_status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

        let Some((status_raw, payment_raw)) = row else {
            return Ok(None);
        };
        let order_status: OrderStatus = status_raw
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {id}: {e}")))?;
        let current: PaymentStatus = payment_raw
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {id}: {e}")))?;

        if !current.can_transition_to(next) {
            return Ok(Some(TransitionOutcome::Illegal {
                from_order: order_status,
                from_payment: current,
            }));
        }

        sqlx::query("UPDATE orders SET payment_status = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(next.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(TransitionOutcome::Applied))
    }
}
