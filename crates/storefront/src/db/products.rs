//! Product catalog repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use orchard_core::{CategoryId, CurrencyCode, Money, ProductId};

use super::RepositoryError;
use crate::models::Product;

/// Maximum page size for product listings.
const MAX_PER_PAGE: u32 = 100;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock_quantity: i32,
    category_id: Option<Uuid>,
    image_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let stock_quantity = u32::try_from(self.stock_quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative stock for product {}: {}",
                self.id, self.stock_quantity
            ))
        })?;

        Ok(Product {
            id: ProductId::from_uuid(self.id),
            sku: self.sku,
            name: self.name,
            description: self.description,
            // Catalog prices are stored in the base currency
            price: Money::new(self.price, CurrencyCode::BASE),
            stock_quantity,
            category_id: self.category_id.map(CategoryId::from_uuid),
            image_url: self.image_url,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A page of products plus the total count of active products.
#[derive(Debug)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
}

/// Repository for product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first.
    ///
    /// `page` is 1-based; `per_page` is clamped to [1, 100].
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if a query fails or a row is invalid.
    pub async fn list_active(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<ProductPage, RepositoryError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, sku, name, description, price, stock_quantity,
                   category_id, image_url, active, created_at, updated_at
            FROM products
            WHERE active
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE active")
            .fetch_one(self.pool)
            .await?;

        let products = rows
            .into_iter()
            .map(ProductRow::into_product)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductPage {
            products,
            total,
            page,
        })
    }

    /// Fetch a single product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the query fails or the row is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, sku, name, description, price, stock_quantity,
                   category_id, image_url, active, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }
}
