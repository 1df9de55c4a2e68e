//! Database operations for the catalog and cart.
//!
//! # Database
//!
//! ## Tables
//!
//! - `categories` - Product categories
//! - `products` - Products (string slug ids)
//! - `product_prices` - One current price per product
//! - `product_images` - Gallery images, ordered by id
//! - `product_attributes` - One row per attribute value
//! - `cart` - Cart lines, unique per product + option combination
//! - `orders` - Placed orders with a JSON cart snapshot
//!
//! # Stores
//!
//! Resolvers talk to storage through the [`CatalogStore`] and [`CartStore`]
//! traits. [`CatalogRepository`] and [`CartRepository`] implement them over a
//! `PostgreSQL` pool; each call checks a connection out of the pool and
//! returns it when the statement or transaction finishes.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p shopql-cli -- migrate
//! ```

pub mod cart;
pub mod catalog;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shopql_core::{CartItemId, OrderId, ProductId};

use crate::models::{CartLine, Category, NewCartItem, Order, Product, ProductAttributes};

pub use cart::CartRepository;
pub use catalog::CatalogRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., checkout of an empty cart).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A value does not fit its column.
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

impl RepositoryError {
    /// Wrap a sqlx error, reporting numeric overflow as `OutOfRange` with
    /// `message`.
    pub(crate) fn out_of_range_as(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) =>
            {
                Self::OutOfRange(message.to_owned())
            }
            _ => Self::Database(err),
        }
    }
}

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All categories in id order.
    async fn categories(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Product listings, optionally restricted to an exact category name.
    async fn products(&self, category_name: Option<&str>) -> Result<Vec<Product>, RepositoryError>;

    /// Full product detail.
    ///
    /// Returns `Ok(None)` when the product does not exist or lacks a price or
    /// category row.
    async fn product_details(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Aggregated attributes of every product, ordered by product id.
    async fn all_attributes(&self) -> Result<Vec<ProductAttributes>, RepositoryError>;
}

/// The shopping cart and checkout.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Insert a cart line, or add to the quantity of the line with the same
    /// product and options.
    ///
    /// Fails with `RepositoryError::NotFound` if the product has no price and
    /// with `OutOfRange` if the merged quantity overflows.
    async fn add_item(&self, item: NewCartItem) -> Result<CartItemId, RepositoryError>;

    /// Add one unit of a product with default options selected.
    ///
    /// Fails with `RepositoryError::NotFound` if the product has no price.
    async fn quick_add(&self, product_id: &ProductId) -> Result<CartItemId, RepositoryError>;

    /// Set the quantity of a line. Fails with `NotFound` for an unknown id.
    async fn update_quantity(&self, id: CartItemId, quantity: i32) -> Result<(), RepositoryError>;

    /// Remove a line. Fails with `NotFound` for an unknown id.
    async fn delete_item(&self, id: CartItemId) -> Result<(), RepositoryError>;

    /// A single rendered cart line.
    async fn line(&self, id: CartItemId) -> Result<Option<CartLine>, RepositoryError>;

    /// All cart lines ordered by id.
    async fn lines(&self) -> Result<Vec<CartLine>, RepositoryError>;

    /// Snapshot the cart into a new order and empty the cart, atomically.
    ///
    /// Fails with `Conflict` when the cart is empty.
    async fn place_order(&self, total: Decimal) -> Result<OrderId, RepositoryError>;

    /// Get a placed order by ID.
    async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
