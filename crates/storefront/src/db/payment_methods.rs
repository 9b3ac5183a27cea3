//! Payment method reads.
//!
//! The set of ways to pay is store-configured data, not code; the checkout's
//! payment step offers whatever is active here.

use sqlx::PgPool;
use uuid::Uuid;

use orchard_core::PaymentMethodId;

use super::RepositoryError;
use crate::models::{PaymentMethod, PaymentProvider};

#[derive(sqlx::FromRow)]
struct PaymentMethodRow {
    id: Uuid,
    code: String,
    name: String,
    provider: String,
    active: bool,
}

impl PaymentMethodRow {
    fn into_method(self) -> Result<PaymentMethod, RepositoryError> {
        let provider: PaymentProvider = self
            .provider
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(PaymentMethod {
            id: PaymentMethodId::from_uuid(self.id),
            code: self.code,
            name: self.name,
            provider,
            active: self.active,
        })
    }
}

/// List the active payment methods, in configured display order.
///
/// # Errors
///
/// Returns [`RepositoryError`] if the query fails or a row is invalid.
pub async fn list_active(pool: &PgPool) -> Result<Vec<PaymentMethod>, RepositoryError> {
    let rows: Vec<PaymentMethodRow> = sqlx::query_as(
        r"
        SELECT id, code, name, provider, active
        FROM payment_methods
        WHERE active
        ORDER BY position, code
        ",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(PaymentMethodRow::into_method).collect()
}

/// Fetch one payment method if it exists and is active.
///
/// Used to re-validate the draft's selection at submission time; a method
/// deactivated mid-checkout must not reach the order.
///
/// # Errors
///
/// Returns [`RepositoryError`] if the query fails or the row is invalid.
pub async fn get_active(
    pool: &PgPool,
    id: PaymentMethodId,
) -> Result<Option<PaymentMethod>, RepositoryError> {
    let row: Option<PaymentMethodRow> = sqlx::query_as(
        r"
        SELECT id, code, name, provider, active
        FROM payment_methods
        WHERE id = $1 AND active
        ",
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    row.map(PaymentMethodRow::into_method).transpose()
}
