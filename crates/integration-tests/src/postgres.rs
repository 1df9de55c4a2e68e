//! Fixture for running the schema over the `PostgreSQL` repositories.
//!
//! Tests using [`PgContext`] need a `PostgreSQL` 15+ database named by
//! `SHOPQL_TEST_DATABASE_URL`. Each context migrates the database, empties
//! it, and loads the demo catalog. Contexts hold a process-wide lock, so tests
//! sharing the database run one at a time.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::Request;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::{Mutex, MutexGuard};

use shopql_api::config::GraphqlConfig;
use shopql_api::db::{CartRepository, CatalogRepository};
use shopql_api::graphql::{ShopSchema, build_schema};

use crate::{DEMO_CATEGORIES, ProductSeed, demo_products, execute_json};

/// Environment variable naming the test database.
pub const TEST_DATABASE_URL: &str = "SHOPQL_TEST_DATABASE_URL";

static DATABASE_LOCK: Mutex<()> = Mutex::const_new(());

/// A schema over the `PostgreSQL` repositories and the pool behind them.
pub struct PgContext {
    pub pool: PgPool,
    pub cart: CartRepository,
    pub schema: ShopSchema,
    _lock: MutexGuard<'static, ()>,
}

impl PgContext {
    /// Connect, migrate, and reset the test database to the demo catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if `SHOPQL_TEST_DATABASE_URL` is unset or any
    /// database step fails.
    pub async fn new() -> Result<Self, sqlx::Error> {
        let lock = DATABASE_LOCK.lock().await;

        let url = std::env::var(TEST_DATABASE_URL).map_err(|_| {
            sqlx::Error::Configuration(format!("{TEST_DATABASE_URL} is not set").into())
        })?;
        let pool = PgPoolOptions::new().max_connections(4).connect(&url).await?;

        sqlx::migrate!("../api/migrations").run(&pool).await?;
        reset(&pool).await?;
        load_catalog(&pool, DEMO_CATEGORIES, &demo_products()).await?;

        let catalog = Arc::new(CatalogRepository::new(pool.clone()));
        let cart = CartRepository::new(pool.clone());
        let schema = build_schema(catalog, Arc::new(cart.clone()), &GraphqlConfig::default());

        Ok(Self {
            pool,
            cart,
            schema,
            _lock: lock,
        })
    }

    /// Execute a GraphQL document and return the response as JSON.
    pub async fn execute(&self, query: &str) -> Value {
        execute_json(&self.schema, Request::new(query)).await
    }

    /// Number of rows in `orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn order_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
    }

    /// Number of rows in `cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn cart_row_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM cart")
            .fetch_one(&self.pool)
            .await
    }

    /// Make every `DELETE` on `cart` fail until the next reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger cannot be created.
    pub async fn fail_cart_clear(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE OR REPLACE FUNCTION shopql_test_refuse_delete() RETURNS trigger
            LANGUAGE plpgsql AS $$
            BEGIN
                RAISE EXCEPTION 'cart clear refused';
            END
            $$
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TRIGGER shopql_test_refuse_cart_delete BEFORE DELETE ON cart \
             FOR EACH STATEMENT EXECUTE FUNCTION shopql_test_refuse_delete()",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

async fn reset(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TRIGGER IF EXISTS shopql_test_refuse_cart_delete ON cart")
        .execute(pool)
        .await?;
    sqlx::query(
        "TRUNCATE cart, orders, product_attributes, product_images, product_prices, \
         products, categories RESTART IDENTITY",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn load_catalog(
    pool: &PgPool,
    categories: &[&str],
    products: &[ProductSeed],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let mut category_ids = HashMap::new();
    for name in categories {
        let id: i32 = sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
        category_ids.insert(*name, id);
    }

    for product in products {
        sqlx::query(
            "INSERT INTO products (id, name, in_stock, description, category_id) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product.id)
        .bind(product.name)
        .bind(product.in_stock)
        .bind(format!("<p>{}</p>", product.name))
        .bind(product.category.and_then(|name| category_ids.get(name).copied()))
        .execute(&mut *tx)
        .await?;

        if let Some(cents) = product.price_cents {
            sqlx::query(
                "INSERT INTO product_prices (product_id, amount, currency_label, currency_symbol) \
                 VALUES ($1, $2, 'USD', '$')",
            )
            .bind(product.id)
            .bind(Decimal::new(cents, 2))
            .execute(&mut *tx)
            .await?;
        }

        for url in &product.images {
            sqlx::query("INSERT INTO product_images (product_id, image_url) VALUES ($1, $2)")
                .bind(product.id)
                .bind(*url)
                .execute(&mut *tx)
                .await?;
        }

        for (name, value) in &product.attributes {
            sqlx::query(
                "INSERT INTO product_attributes (product_id, attribute_name, attribute_value) \
                 VALUES ($1, $2, $3)",
            )
            .bind(product.id)
            .bind(*name)
            .bind(*value)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await
}
