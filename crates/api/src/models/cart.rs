//! Cart models.

use shopql_core::{CartItemId, CartOptions, Price, ProductId};

/// Parameters for adding a product to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_id: ProductId,
    /// Quantity to add; validated to be at least 1 before reaching storage.
    pub quantity: i32,
    pub options: CartOptions,
}

/// A cart line joined with its product and price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    /// Unit price captured when the line was created.
    pub unit_price: Price,
    pub quantity: i32,
    pub options: CartOptions,
    pub first_image: Option<String>,
}

impl CartLine {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> rust_decimal::Decimal {
        self.unit_price.line_total(self.quantity)
    }
}
