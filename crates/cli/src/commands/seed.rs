//! Database seeding for local development.
//!
//! Inserts a small sample catalog, the two payment methods, and a few
//! display currencies. Safe to re-run: every insert is `ON CONFLICT DO
//! NOTHING` keyed on the natural unique column.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use orchard_core::{CategoryId, PaymentMethodId, ProductId};

use super::CliError;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price_minor: i64,
    stock: i32,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Walnut Serving Board",
        description: "End-grain walnut board, oiled and ready for the table.",
        price_minor: 2999,
        stock: 24,
    },
    SeedProduct {
        name: "Stoneware Mug",
        description: "Hand-thrown 350ml mug with a matte glaze.",
        price_minor: 1850,
        stock: 60,
    },
    SeedProduct {
        name: "Linen Tea Towel",
        description: "Washed linen, herringbone weave.",
        price_minor: 1000,
        stock: 120,
    },
    SeedProduct {
        name: "Copper Pour-Over Kettle",
        description: "1L gooseneck kettle for slow mornings.",
        price_minor: 7400,
        stock: 8,
    },
];

/// Seed the database.
///
/// # Errors
///
/// Returns [`CliError`] if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = super::database_url()?;
    let pool = PgPool::connect(&database_url).await?;

    seed_category_and_products(&pool).await?;
    seed_payment_methods(&pool).await?;
    seed_currencies(&pool).await?;

    tracing::info!("Seed complete");
    Ok(())
}

async fn seed_category_and_products(pool: &PgPool) -> Result<(), CliError> {
    sqlx::query(
        r"
        INSERT INTO categories (id, name, slug)
        VALUES ($1, 'Kitchen', 'kitchen')
        ON CONFLICT (slug) DO NOTHING
        ",
    )
    .bind(CategoryId::generate())
    .execute(pool)
    .await?;

    let (category_id,): (Uuid,) =
        sqlx::query_as("SELECT id FROM categories WHERE slug = 'kitchen'")
            .fetch_one(pool)
            .await?;

    for product in PRODUCTS {
        let sku = format!("SKU-{:08}", rand::random::<u32>() % 100_000_000);
        sqlx::query(
            r"
            INSERT INTO products
                (id, sku, name, description, price, stock_quantity, category_id, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            ON CONFLICT (sku) DO NOTHING
            ",
        )
        .bind(ProductId::generate())
        .bind(&sku)
        .bind(product.name)
        .bind(product.description)
        .bind(Decimal::new(product.price_minor, 2))
        .bind(product.stock)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    tracing::info!("Seeded {} products", PRODUCTS.len());
    Ok(())
}

async fn seed_payment_methods(pool: &PgPool) -> Result<(), CliError> {
    let methods = [
        ("card", "Credit or debit card", "stripe", 0),
        ("paypal", "PayPal", "paypal", 1),
    ];

    for (code, name, provider, position) in methods {
        sqlx::query(
            r"
            INSERT INTO payment_methods (id, code, name, provider, active, position)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            ON CONFLICT (code) DO NOTHING
            ",
        )
        .bind(PaymentMethodId::generate())
        .bind(code)
        .bind(name)
        .bind(provider)
        .bind(position)
        .execute(pool)
        .await?;
    }

    tracing::info!("Seeded payment methods");
    Ok(())
}

async fn seed_currencies(pool: &PgPool) -> Result<(), CliError> {
    // USD is inserted by the migration; rates here are dev fixtures, a real
    // deployment maintains this table out of band.
    let currencies = [
        ("EUR", "€", "0.92"),
        ("GBP", "£", "0.79"),
        ("CAD", "$", "1.36"),
    ];

    for (code, symbol, rate) in currencies {
        let rate: Decimal = rate.parse().unwrap_or(Decimal::ONE);
        sqlx::query(
            r"
            INSERT INTO currencies (code, symbol, exchange_rate, active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (code) DO NOTHING
            ",
        )
        .bind(code)
        .bind(symbol)
        .bind(rate)
        .execute(pool)
        .await?;
    }

    tracing::info!("Seeded currencies");
    Ok(())
}
