//! Order persistence.
//!
//! Writing happens only through [`place`], on a connection owned by the order
//! manager's transaction: the header and every item row commit together or
//! not at all. Order numbers come from a dedicated sequence, so they cannot
//! collide however many submissions race.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use orchard_core::{
    CurrencyCode, CustomerId, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentMethodId,
    PaymentStatus,
};

use super::RepositoryError;
use crate::models::{NewOrder, Order};

/// Persist a complete order (header + items) on the given connection.
///
/// Returns the new order's ID and generated order number.
///
/// # Errors
///
/// Returns [`RepositoryError`] if any statement fails; the caller's
/// transaction rolls everything back in that case.
pub async fn place(
    conn: &mut PgConnection,
    order: &NewOrder,
) -> Result<(OrderId, OrderNumber), RepositoryError> {
    let order_number = next_order_number(&mut *conn).await?;
    let order_id = OrderId::generate();

    let shipping_json = serde_json::to_value(&order.shipping_address)
        .map_err(|e| RepositoryError::DataCorruption(format!("unencodable address: {e}")))?;

    sqlx::query(
        r"
        INSERT INTO orders (
            id, order_number, customer_id, status, payment_status,
            payment_method_id, currency, subtotal, shipping_amount,
            tax_amount, total_amount, shipping_address
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ",
    )
    .bind(order_id.as_uuid())
    .bind(order_number.as_str())
    .bind(order.customer_id.as_uuid())
    .bind(OrderStatus::Pending.as_str())
    .bind(PaymentStatus::Pending.as_str())
    .bind(order.payment_method_id.as_uuid())
    .bind(order.currency.code())
    .bind(order.subtotal)
    .bind(order.shipping_amount)
    .bind(order.tax_amount)
    .bind(order.total_amount)
    .bind(shipping_json)
    .execute(&mut *conn)
    .await?;

    insert_items(&mut *conn, order_id, order).await?;

    Ok((order_id, order_number))
}

/// Draw the next order number from the sequence.
async fn next_order_number(conn: &mut PgConnection) -> Result<OrderNumber, RepositoryError> {
    let (seq,): (i64,) = sqlx::query_as("SELECT nextval('order_number_seq')")
        .fetch_one(conn)
        .await?;
    Ok(OrderNumber::from_sequence(seq))
}

/// Batch-insert one row per order item.
async fn insert_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    order: &NewOrder,
) -> Result<(), RepositoryError> {
    if order.items.is_empty() {
        // The checkout flow refuses empty carts long before this point.
        return Err(RepositoryError::DataCorruption(
            "order with no items".to_owned(),
        ));
    }

    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "INSERT INTO order_items (id, order_id, product_id, name, sku, unit_price, quantity, total_price) ",
    );
    builder.push_values(&order.items, |mut row, item| {
        row.push_bind(OrderItemId::generate().as_uuid())
            .push_bind(order_id.as_uuid())
            .push_bind(item.product_id.as_uuid())
            .push_bind(&item.name)
            .push_bind(&item.sku)
            .push_bind(item.unit_price)
            .push_bind(i64::from(item.quantity))
            .push_bind(item.total_price);
    });
    builder.build().execute(conn).await?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_id: Uuid,
    status: String,
    payment_status: String,
    payment_method_id: Uuid,
    currency: String,
    subtotal: Decimal,
    shipping_amount: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    shipping_address: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let corrupt = |what: &str, detail: String| {
            RepositoryError::DataCorruption(format!("order {}: bad {what}: {detail}", self.id))
        };

        Ok(Order {
            id: OrderId::from_uuid(self.id),
            order_number: OrderNumber::from_stored(self.order_number.clone()),
            customer_id: CustomerId::from_uuid(self.customer_id),
            status: self
                .status
                .parse()
                .map_err(|e| corrupt("status", format!("{e}")))?,
            payment_status: self
                .payment_status
                .parse()
                .map_err(|e| corrupt("payment status", format!("{e}")))?,
            payment_method_id: PaymentMethodId::from_uuid(self.payment_method_id),
            currency: self
                .currency
                .parse::<CurrencyCode>()
                .map_err(|e| corrupt("currency", format!("{e}")))?,
            subtotal: self.subtotal,
            shipping_amount: self.shipping_amount,
            tax_amount: self.tax_amount,
            total_amount: self.total_amount,
            shipping_address: serde_json::from_value(self.shipping_address.clone())
                .map_err(|e| corrupt("shipping address", format!("{e}")))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fetch one order header by ID.
///
/// # Errors
///
/// Returns [`RepositoryError`] if the query fails or the row is invalid.
pub async fn get(pool: &PgPool, id: OrderId) -> Result<Option<Order>, RepositoryError> {
    let row: Option<OrderRow> = sqlx::query_as(
        r"
        SELECT id, order_number, customer_id, status, payment_status,
               payment_method_id, currency, subtotal, shipping_amount,
               tax_amount, total_amount, shipping_address, created_at, updated_at
        FROM orders
        WHERE id = $1
        ",
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    row.map(OrderRow::into_order).transpose()
}
