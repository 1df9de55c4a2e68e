//! Catalog repository: categories, products, and attributes.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use shopql_core::{
    Attribute, AttributeRow, CategoryId, Currency, Price, ProductId, collect_attributes,
    group_attributes,
};

use super::{CatalogStore, RepositoryError};
use crate::models::{Category, Product, ProductAttributes};

/// Listing row: products outer-joined with price and category.
#[derive(Debug, sqlx::FromRow)]
struct ProductListRow {
    product_id: ProductId,
    name: String,
    in_stock: bool,
    price: Option<Decimal>,
    currency_label: Option<String>,
    currency_symbol: Option<String>,
    category_id: Option<CategoryId>,
    category_name: Option<String>,
    first_image: Option<String>,
}

impl From<ProductListRow> for Product {
    fn from(row: ProductListRow) -> Self {
        let price = match (row.price, row.currency_label, row.currency_symbol) {
            (Some(amount), Some(label), Some(symbol)) => {
                Some(Price::new(amount, Currency::new(label, symbol)))
            }
            _ => None,
        };
        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(Category { id, name }),
            _ => None,
        };

        Self {
            id: row.product_id,
            name: row.name,
            in_stock: row.in_stock,
            description: None,
            price,
            category,
            first_image: row.first_image,
            images: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// Detail row: products inner-joined with price and category.
#[derive(Debug, sqlx::FromRow)]
struct ProductDetailRow {
    product_id: ProductId,
    name: String,
    in_stock: bool,
    description: String,
    price: Decimal,
    currency_label: String,
    currency_symbol: String,
    category_id: CategoryId,
    category_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AttributeValueRow {
    product_id: ProductId,
    attribute_name: String,
    attribute_value: String,
}

impl From<AttributeValueRow> for AttributeRow {
    fn from(row: AttributeValueRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.attribute_name,
            value: row.attribute_value,
        }
    }
}

/// `PostgreSQL`-backed catalog.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn products(&self, category_name: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductListRow>(
            r"
            SELECT
                p.id AS product_id,
                p.name,
                p.in_stock,
                pp.amount AS price,
                pp.currency_label,
                pp.currency_symbol,
                c.id AS category_id,
                c.name AS category_name,
                (
                    SELECT pi.image_url
                    FROM product_images pi
                    WHERE pi.product_id = p.id
                    ORDER BY pi.id
                    LIMIT 1
                ) AS first_image
            FROM products p
            LEFT JOIN product_prices pp ON pp.product_id = p.id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE $1::TEXT IS NULL OR c.name = $1
            ORDER BY p.id
            ",
        )
        .bind(category_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product_details(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, ProductDetailRow>(
            r"
            SELECT
                p.id AS product_id,
                p.name,
                p.in_stock,
                p.description,
                pp.amount AS price,
                pp.currency_label,
                pp.currency_symbol,
                c.id AS category_id,
                c.name AS category_name
            FROM products p
            INNER JOIN product_prices pp ON pp.product_id = p.id
            INNER JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let images: Vec<String> = sqlx::query_scalar(
            "SELECT image_url FROM product_images WHERE product_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let pairs: Vec<(String, String)> = sqlx::query_as(
            r"
            SELECT attribute_name, attribute_value
            FROM product_attributes
            WHERE product_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Product {
            id: row.product_id,
            name: row.name,
            in_stock: row.in_stock,
            description: Some(row.description),
            price: Some(Price::new(
                row.price,
                Currency::new(row.currency_label, row.currency_symbol),
            )),
            category: Some(Category {
                id: row.category_id,
                name: row.category_name,
            }),
            first_image: images.first().cloned(),
            images,
            attributes: collect_attributes(pairs),
        }))
    }

    #[instrument(skip(self))]
    async fn all_attributes(&self) -> Result<Vec<ProductAttributes>, RepositoryError> {
        let product_ids: Vec<ProductId> =
            sqlx::query_scalar("SELECT id FROM products ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, AttributeValueRow>(
            r"
            SELECT product_id, attribute_name, attribute_value
            FROM product_attributes
            ORDER BY product_id, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<ProductId, Vec<Attribute>> =
            group_attributes(rows.into_iter().map(AttributeRow::from))
                .into_iter()
                .collect();

        // Products without attribute rows get an empty list.
        let result = product_ids
            .into_iter()
            .map(|product_id| ProductAttributes {
                attributes: grouped.remove(&product_id).unwrap_or_default(),
                product_id,
            })
            .collect();

        Ok(result)
    }
}
