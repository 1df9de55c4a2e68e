//! Mutation root: cart changes and checkout.

use std::sync::Arc;

use async_graphql::{Object, Result, ResultExt};
use rust_decimal::Decimal;

use shopql_core::{CartItemId, CartOptions, ProductId, validate_quantity};

use super::types::CartItemObject;
use crate::db::{CartStore, RepositoryError};
use crate::error::{self, AppError, add_breadcrumb};
use crate::models::NewCartItem;

/// The root GraphQL mutation type.
pub struct MutationRoot {
    pub(crate) cart: Arc<dyn CartStore>,
}

/// Map a repository failure, giving `NotFound` a caller-specific message.
fn or_not_found(err: RepositoryError, message: &str) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(message.to_string()),
        other => AppError::from(other),
    }
}

fn checked_quantity(quantity: i32) -> error::Result<i32> {
    validate_quantity(quantity).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Largest total the `orders.total` column (`NUMERIC(12, 2)`) can hold.
const MAX_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Convert a client-reported total into a two-decimal amount.
fn parse_total(total: f64) -> error::Result<Decimal> {
    if !total.is_finite() || total < 0.0 {
        return Err(AppError::BadRequest(format!(
            "total must be a non-negative number (got {total})"
        )));
    }
    let amount = Decimal::try_from(total)
        .map(|d| d.round_dp(2))
        .map_err(|e| AppError::BadRequest(format!("total is out of range: {e}")))?;
    if amount > MAX_TOTAL {
        return Err(AppError::BadRequest(format!(
            "total must not exceed {MAX_TOTAL} (got {amount})"
        )));
    }
    Ok(amount)
}

impl MutationRoot {
    async fn add_line(
        &self,
        product_id: String,
        quantity: i32,
        options: CartOptions,
    ) -> error::Result<CartItemObject> {
        let item = NewCartItem {
            product_id: ProductId::from(product_id),
            quantity: checked_quantity(quantity)?,
            options,
        };
        let id = self
            .cart
            .add_item(item)
            .await
            .map_err(|e| or_not_found(e, "Failed to add product to cart."))?;

        let line = self
            .cart
            .line(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("cart item {id} vanished after insert")))?;

        Ok(CartItemObject(line))
    }

    async fn set_quantity(&self, id: CartItemId, quantity: i32) -> error::Result<i32> {
        let quantity = checked_quantity(quantity)?;
        self.cart
            .update_quantity(id, quantity)
            .await
            .map_err(|e| or_not_found(e, "Failed to update cart item."))?;
        Ok(id.as_i32())
    }

    async fn checkout(&self, total: f64) -> error::Result<i32> {
        let total = parse_total(total)?;
        let order_id = self.cart.place_order(total).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::BadRequest("Cannot place an order with an empty cart.".to_string())
            }
            other => AppError::from(other),
        })?;
        Ok(order_id.as_i32())
    }
}

#[Object]
impl MutationRoot {
    /// Add a product with explicit options. Adding an identical combination
    /// again increases the existing line's quantity.
    #[allow(clippy::too_many_arguments)]
    async fn add_to_cart(
        &self,
        #[graphql(name = "productID")] product_id: String,
        quantity: i32,
        color: Option<String>,
        size: Option<String>,
        capacity: Option<String>,
        #[graphql(name = "usb_port")] usb_port: Option<String>,
        #[graphql(name = "touch_id")] touch_id: Option<String>,
    ) -> Result<CartItemObject> {
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

        let options = CartOptions {
            color,
            size,
            capacity,
            usb_port,
            touch_id,
        };
        self.add_line(product_id, quantity, options).await.extend()
    }

    /// Add one unit with default options; returns the cart item id.
    async fn quick_add_to_cart(
        &self,
        #[graphql(name = "productID")] product_id: String,
    ) -> Result<i32> {
        add_breadcrumb("cart", "Quick added to cart", Some(&[("product_id", product_id.as_str())]));

        self.cart
            .quick_add(&ProductId::from(product_id))
            .await
            .map(|id| id.as_i32())
            .map_err(|e| or_not_found(e, "Failed to add product to cart."))
            .extend()
    }

    /// Remove a cart line; returns the removed id.
    #[graphql(name = "DeleteCartItem")]
    async fn delete_cart_item(
        &self,
        #[graphql(name = "cartitemID")] cart_item_id: i32,
    ) -> Result<i32> {
        self.cart
            .delete_item(CartItemId::new(cart_item_id))
            .await
            .map(|()| cart_item_id)
            .map_err(|e| or_not_found(e, "Failed to delete cart item."))
            .extend()
    }

    /// Set a cart line's quantity; returns the updated id.
    #[graphql(name = "UpdateCartItem")]
    async fn update_cart_item(
        &self,
        #[graphql(name = "cartitemID")] cart_item_id: i32,
        quantity: i32,
    ) -> Result<i32> {
        self.set_quantity(CartItemId::new(cart_item_id), quantity)
            .await
            .extend()
    }

    /// Turn the cart into an order and empty it; returns the order id.
    ///
    /// The total is supplied by the client and stored as given.
    async fn place_order(&self, total: f64) -> Result<i32> {
        add_breadcrumb("checkout", "Placing order", None);
        self.checkout(total).await.extend()
    }
}
