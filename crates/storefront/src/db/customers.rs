//! Customer repository.
//!
//! Customers are materialized at order submission from the shipping info.
//! Lookup is by email so a returning buyer maps onto one customer row; the
//! order itself always carries the full shipping snapshot.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use orchard_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::{Customer, ShippingAddress};

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self) -> Result<Customer, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Customer {
            id: CustomerId::from_uuid(self.id),
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            created_at: self.created_at,
        })
    }
}

/// Find the customer for this email or create one from the shipping info.
///
/// Runs on a connection (not a pool) so the order manager can call it inside
/// its transaction.
///
/// # Errors
///
/// Returns [`RepositoryError`] if a query fails or a stored row is invalid.
pub async fn find_or_create(
    conn: &mut PgConnection,
    shipping: &ShippingAddress,
) -> Result<Customer, RepositoryError> {
    let existing: Option<CustomerRow> = sqlx::query_as(
        r"
        SELECT id, email, first_name, last_name, phone, created_at
        FROM customers
        WHERE email = $1
        ",
    )
    .bind(shipping.email.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = existing {
        return row.into_customer();
    }

    let row: CustomerRow = sqlx::query_as(
        r"
        INSERT INTO customers (id, email, first_name, last_name, phone)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, first_name, last_name, phone, created_at
        ",
    )
    .bind(CustomerId::generate().as_uuid())
    .bind(shipping.email.as_str())
    .bind(&shipping.first_name)
    .bind(&shipping.last_name)
    .bind(&shipping.phone)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            // Lost a race with a concurrent submission for the same email
            return RepositoryError::Conflict("customer email already exists".to_owned());
        }
        RepositoryError::Database(e)
    })?;

    row.into_customer()
}
