//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency attached to a product price row.
///
/// The catalog stores both the ISO label (`USD`) and the display symbol (`$`)
/// alongside each price, so no currency table is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 currency code (e.g. `USD`).
    pub label: String,
    /// Display symbol (e.g. `$`).
    pub symbol: String,
}

impl Currency {
    /// Create a new currency.
    #[must_use]
    pub fn new(label: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            symbol: symbol.into(),
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new("USD", "$")
    }
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    pub currency: Currency,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol, self.amount)
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn line_total(&self, quantity: i32) -> Decimal {
        self.amount * Decimal::from(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_cents() {
        let price = Price::new(Decimal::new(144_69, 2), Currency::default());
        assert_eq!(price.display(), "$144.69");
    }

    #[test]
    fn test_line_total() {
        let price = Price::new(Decimal::new(1999, 2), Currency::new("EUR", "€"));
        assert_eq!(price.line_total(3), Decimal::new(5997, 2));
    }
}
