//! Order models.
//!
//! An order stores a JSON snapshot of the cart at checkout. The snapshot keys
//! match the cart fields of the GraphQL API so stored orders read the same as
//! the `cart` query did at the time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopql_core::{CartItemId, OrderId, ProductId};

use super::CartLine;

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    /// Total as reported by the client at checkout.
    pub total: Decimal,
    pub details: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

/// One cart line frozen into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "cartitemID")]
    pub cart_item_id: CartItemId,
    #[serde(rename = "productID")]
    pub product_id: ProductId,
    pub name: String,
    pub price_per_unit: Decimal,
    pub quantity: i32,
    pub currency_symbol: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub capacity: Option<String>,
    pub usb_port: Option<String>,
    pub touch_id: Option<String>,
    pub first_image: Option<String>,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            cart_item_id: line.id,
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price_per_unit: line.unit_price.amount,
            quantity: line.quantity,
            currency_symbol: line.unit_price.currency.symbol.clone(),
            color: line.options.color.clone(),
            size: line.options.size.clone(),
            capacity: line.options.capacity.clone(),
            usb_port: line.options.usb_port.clone(),
            touch_id: line.options.touch_id.clone(),
            first_image: line.first_image.clone(),
        }
    }
}

/// Sum of line totals for a cart snapshot.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// Compare a client-reported order total against the snapshot subtotal.
///
/// The reported total is what gets stored; a mismatch is only logged so that
/// pricing drift between client and server shows up in the logs.
pub fn check_reported_total(reported: Decimal, lines: &[CartLine]) -> bool {
    let computed = subtotal(lines);
    let matches = computed == reported;
    if !matches {
        tracing::warn!(
            reported = %reported,
            computed = %computed,
            lines = lines.len(),
            "Client-reported order total differs from cart subtotal"
        );
    }
    matches
}
