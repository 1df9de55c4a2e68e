//! Cart repository: cart lines and checkout.
//!
//! Cart lines are unique per product + option combination
//! (`cart_line_options_key`, with NULLs comparing equal), so adding the same
//! combination twice upserts into a single line.
//! A merge that would overflow the quantity column is reported as
//! `RepositoryError::OutOfRange` and leaves the line unchanged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::instrument;

use shopql_core::{CartItemId, CartOptions, Currency, OrderId, Price, ProductId};

use super::{CartStore, RepositoryError};
use crate::models::{CartLine, NewCartItem, Order, OrderLine, check_reported_total};

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    cartitem_id: CartItemId,
    product_id: ProductId,
    name: String,
    price_per_unit: Decimal,
    currency_label: String,
    currency_symbol: String,
    quantity: i32,
    color: Option<String>,
    size: Option<String>,
    capacity: Option<String>,
    usb_port: Option<String>,
    touch_id: Option<String>,
    first_image: Option<String>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: row.cartitem_id,
            product_id: row.product_id,
            name: row.name,
            unit_price: Price::new(
                row.price_per_unit,
                Currency::new(row.currency_label, row.currency_symbol),
            ),
            quantity: row.quantity,
            options: CartOptions {
                color: row.color,
                size: row.size,
                capacity: row.capacity,
                usb_port: row.usb_port,
                touch_id: row.touch_id,
            },
            first_image: row.first_image,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    total: Decimal,
    order_details: sqlx::types::Json<Vec<OrderLine>>,
    created_at: DateTime<Utc>,
}

/// Insert a line or add to the quantity of the matching line.
///
/// The price is resolved from the product's current price row; `None` means
/// the product has no price (or does not exist) and nothing was written.
async fn upsert_line(
    conn: &mut PgConnection,
    item: &NewCartItem,
) -> Result<Option<CartItemId>, sqlx::Error> {
    sqlx::query_scalar::<_, CartItemId>(
        r"
        INSERT INTO cart (product_id, price_id, quantity, color, size, capacity, usb_port, touch_id)
        SELECT $1, pp.id, $2, $3, $4, $5, $6, $7
        FROM product_prices pp
        WHERE pp.product_id = $1
        ON CONFLICT ON CONSTRAINT cart_line_options_key
        DO UPDATE SET quantity = cart.quantity + EXCLUDED.quantity
        RETURNING cartitem_id
        ",
    )
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.options.color.as_deref())
    .bind(item.options.size.as_deref())
    .bind(item.options.capacity.as_deref())
    .bind(item.options.usb_port.as_deref())
    .bind(item.options.touch_id.as_deref())
    .fetch_optional(conn)
    .await
}

const QUANTITY_TOO_LARGE: &str = "Cart item quantity is too large.";

/// Cart lines ordered by id; `only` restricts the result to one line.
async fn fetch_lines<'e, E>(
    executor: E,
    only: Option<CartItemId>,
) -> Result<Vec<CartLine>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, CartLineRow>(
        r"
        SELECT
            c.cartitem_id,
            c.product_id,
            p.name,
            pp.amount AS price_per_unit,
            pp.currency_label,
            pp.currency_symbol,
            c.quantity,
            c.color,
            c.size,
            c.capacity,
            c.usb_port,
            c.touch_id,
            (
                SELECT pi.image_url
                FROM product_images pi
                WHERE pi.product_id = p.id
                ORDER BY pi.id
                LIMIT 1
            ) AS first_image
        FROM cart c
        JOIN products p ON p.id = c.product_id
        JOIN product_prices pp ON pp.id = c.price_id
        WHERE $1::INTEGER IS NULL OR c.cartitem_id = $1
        ORDER BY c.cartitem_id
        ",
    )
    .bind(only)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(CartLine::from).collect())
}

/// `PostgreSQL`-backed cart.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for CartRepository {
    #[instrument(skip(self), fields(product_id = %item.product_id, quantity = item.quantity))]
    async fn add_item(&self, item: NewCartItem) -> Result<CartItemId, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        upsert_line(&mut *conn, &item)
            .await
            .map_err(|e| RepositoryError::out_of_range_as(e, QUANTITY_TOO_LARGE))?
            .ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn quick_add(&self, product_id: &ProductId) -> Result<CartItemId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let attributes: Vec<(String, String)> = sqlx::query_as(
            r"
            SELECT attribute_name, attribute_value
            FROM product_attributes
            WHERE product_id = $1
            ORDER BY id
            ",
        )
        .bind(product_id)
        .fetch_all(&mut *tx)
        .await?;

        let options = CartOptions::quick_add_defaults(
            attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        let item = NewCartItem {
            product_id: product_id.clone(),
            quantity: 1,
            options,
        };

        let id = upsert_line(&mut *tx, &item)
            .await
            .map_err(|e| RepositoryError::out_of_range_as(e, QUANTITY_TOO_LARGE))?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn update_quantity(&self, id: CartItemId, quantity: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart SET quantity = $2 WHERE cartitem_id = $1")
            .bind(id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart WHERE cartitem_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn line(&self, id: CartItemId) -> Result<Option<CartLine>, RepositoryError> {
        Ok(fetch_lines(&self.pool, Some(id)).await?.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn lines(&self) -> Result<Vec<CartLine>, RepositoryError> {
        Ok(fetch_lines(&self.pool, None).await?)
    }

    #[instrument(skip(self))]
    async fn place_order(&self, total: Decimal) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Block concurrent cart writes so the snapshot and the clear see the
        // same rows.
        sqlx::query("LOCK TABLE cart IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let lines = fetch_lines(&mut *tx, None).await?;
        if lines.is_empty() {
            return Err(RepositoryError::Conflict("cart is empty".to_owned()));
        }
        check_reported_total(total, &lines);

        let details: Vec<OrderLine> = lines.iter().map(OrderLine::from).collect();
        let order_id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders (total, order_details) VALUES ($1, $2) RETURNING id",
        )
        .bind(total)
        .bind(sqlx::types::Json(&details))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart").execute(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, lines = details.len(), "Order placed");
        Ok(order_id)
    }

    #[instrument(skip(self))]
    async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, total, order_details, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Order {
            id: r.id,
            total: r.total,
            details: r.order_details.0,
            created_at: r.created_at,
        }))
    }
}
