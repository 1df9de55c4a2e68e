//! Seed the catalog from a YAML fixture.
//!
//! The whole fixture is loaded in one transaction: either every category and
//! product lands, or nothing does. Re-seeding the same file updates rows in
//! place, so existing cart lines keep pointing at valid prices.
//!
//! # Fixture Format
//!
//! ```yaml
//! categories: [all, clothes, tech]
//! products:
//!   - id: apple-imac-2021
//!     name: iMac 2021
//!     in_stock: true
//!     category: tech
//!     description: "<p>The new iMac!</p>"
//!     price:
//!       amount: "1688.03"
//!       currency: { label: USD, symbol: "$" }
//!     images:
//!       - https://example.com/imac.jpg
//!     attributes:
//!       - name: Capacity
//!         values: ["256GB", "512GB"]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, Postgres, Transaction};
use tracing::{error, info};

use shopql_core::{Attribute, Price, ProductId};

use super::{MissingDatabaseUrl, connect, database_url};

/// A complete catalog fixture.
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub products: Vec<ProductFixture>,
}

/// One product with its price, gallery, and attributes.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    pub id: ProductId,
    pub name: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub price: Option<Price>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

const fn default_in_stock() -> bool {
    true
}

/// Errors from seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid fixture: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Check cross-references and values before touching the database.
///
/// Returns one message per problem; an empty list means the fixture is valid.
#[must_use]
pub fn validate_fixture(fixture: &CatalogFixture) -> Vec<String> {
    let mut errors = Vec::new();
    let categories: HashSet<&str> = fixture.categories.iter().map(String::as_str).collect();

    if categories.len() != fixture.categories.len() {
        errors.push("duplicate category names".to_string());
    }
    if fixture.categories.iter().any(|c| c.trim().is_empty()) {
        errors.push("empty category name".to_string());
    }

    let mut seen = HashSet::new();
    for product in &fixture.products {
        let id = product.id.as_str();
        if id.trim().is_empty() {
            errors.push(format!("product '{}' has an empty id", product.name));
        }
        if !seen.insert(id) {
            errors.push(format!("{id}: duplicate product id"));
        }
        if product.name.trim().is_empty() {
            errors.push(format!("{id}: empty name"));
        }
        if let Some(category) = &product.category
            && !categories.contains(category.as_str())
        {
            errors.push(format!("{id}: unknown category '{category}'"));
        }
        if let Some(price) = &product.price
            && price.amount < Decimal::ZERO
        {
            errors.push(format!("{id}: negative price"));
        }
        if product.attributes.iter().any(|a| a.name.trim().is_empty()) {
            errors.push(format!("{id}: attribute with empty name"));
        }
    }

    errors
}

/// Load a fixture file into the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or any insert fails (in which case nothing is committed).
pub async fn run(path: &Path, reset: bool) -> Result<(), SeedError> {
    info!(path = %path.display(), "Loading catalog fixture");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let fixture: CatalogFixture = serde_yaml::from_str(&content)?;

    let errors = validate_fixture(&fixture);
    if !errors.is_empty() {
        error!("Fixture validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let url = database_url()?;
    let pool = connect(&url).await?;
    let mut tx = pool.begin().await?;

    if reset {
        info!("Clearing catalog, cart, and orders");
        reset_tables(&mut tx).await?;
    }

    let category_ids = upsert_categories(&mut tx, &fixture.categories).await?;
    for product in &fixture.products {
        let category_id = product
            .category
            .as_ref()
            .and_then(|name| category_ids.get(name))
            .copied();
        upsert_product(&mut tx, product, category_id).await?;
    }

    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Categories: {}", fixture.categories.len());
    info!("  Products: {}", fixture.products.len());
    Ok(())
}

async fn reset_tables(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "TRUNCATE cart, orders, product_attributes, product_images, product_prices, \
         products, categories RESTART IDENTITY",
    )
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn upsert_categories(
    tx: &mut Transaction<'_, Postgres>,
    names: &[String],
) -> Result<HashMap<String, i32>, sqlx::Error> {
    let mut ids = HashMap::with_capacity(names.len());
    for name in names {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO categories (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;
        ids.insert(name.clone(), id);
    }
    Ok(ids)
}

async fn upsert_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &ProductFixture,
    category_id: Option<i32>,
) -> Result<(), sqlx::Error> {
    let conn: &mut PgConnection = tx;

    sqlx::query(
        "INSERT INTO products (id, name, in_stock, description, category_id) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (id) DO UPDATE SET \
             name = EXCLUDED.name, \
             in_stock = EXCLUDED.in_stock, \
             description = EXCLUDED.description, \
             category_id = EXCLUDED.category_id",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.in_stock)
    .bind(&product.description)
    .bind(category_id)
    .execute(&mut *conn)
    .await?;

    if let Some(price) = &product.price {
        sqlx::query(
            "INSERT INTO product_prices (product_id, amount, currency_label, currency_symbol) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (product_id) DO UPDATE SET \
                 amount = EXCLUDED.amount, \
                 currency_label = EXCLUDED.currency_label, \
                 currency_symbol = EXCLUDED.currency_symbol",
        )
        .bind(&product.id)
        .bind(price.amount)
        .bind(&price.currency.label)
        .bind(&price.currency.symbol)
        .execute(&mut *conn)
        .await?;
        tracing::debug!(product_id = %product.id, price = %price.display(), "Price set");
    }

    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(&product.id)
        .execute(&mut *conn)
        .await?;
    for url in &product.images {
        sqlx::query("INSERT INTO product_images (product_id, image_url) VALUES ($1, $2)")
            .bind(&product.id)
            .bind(url)
            .execute(&mut *conn)
            .await?;
    }

    sqlx::query("DELETE FROM product_attributes WHERE product_id = $1")
        .bind(&product.id)
        .execute(&mut *conn)
        .await?;
    for attribute in &product.attributes {
        for value in &attribute.values {
            sqlx::query(
                "INSERT INTO product_attributes (product_id, attribute_name, attribute_value) \
                 VALUES ($1, $2, $3)",
            )
            .bind(&product.id)
            .bind(&attribute.name)
            .bind(value)
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
categories: [all, tech]
products:
  - id: ps-5
    name: PlayStation 5
    category: tech
    price:
      amount: "844.02"
      currency: { label: USD, symbol: "$" }
    attributes:
      - name: Color
        values: ["Green", "Cyan"]
  - id: xbox-series-s
    name: Xbox Series S 512GB
    in_stock: false
    category: tech
"#;

    #[test]
    fn test_parse_fixture() {
        let fixture: CatalogFixture = serde_yaml::from_str(FIXTURE).unwrap();
        assert_eq!(fixture.categories, vec!["all", "tech"]);
        assert_eq!(fixture.products.len(), 2);

        let ps5 = &fixture.products[0];
        assert_eq!(ps5.id.as_str(), "ps-5");
        assert!(ps5.in_stock);
        assert_eq!(ps5.price.as_ref().unwrap().amount, Decimal::new(84402, 2));
        assert_eq!(ps5.attributes[0].values, vec!["Green", "Cyan"]);

        let xbox = &fixture.products[1];
        assert!(!xbox.in_stock);
        assert!(xbox.price.is_none());
        assert!(xbox.images.is_empty());
    }

    #[test]
    fn test_valid_fixture_has_no_errors() {
        let fixture: CatalogFixture = serde_yaml::from_str(FIXTURE).unwrap();
        assert!(validate_fixture(&fixture).is_empty());
    }

    #[test]
    fn test_validate_reports_problems() {
        let fixture: CatalogFixture = serde_yaml::from_str(
            r"
categories: [tech]
products:
  - id: a
    name: A
    category: clothes
  - id: a
    name: ''
",
        )
        .unwrap();

        let errors = validate_fixture(&fixture);
        assert!(errors.iter().any(|e| e == "a: unknown category 'clothes'"));
        assert!(errors.iter().any(|e| e == "a: duplicate product id"));
        assert!(errors.iter().any(|e| e == "a: empty name"));
    }

    #[test]
    fn test_bundled_fixture_is_valid() {
        let fixture: CatalogFixture =
            serde_yaml::from_str(include_str!("../../fixtures/catalog.yaml")).unwrap();
        assert!(validate_fixture(&fixture).is_empty());
        assert!(!fixture.products.is_empty());
    }
}
