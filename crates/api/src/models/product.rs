//! Product models.

use shopql_core::{Attribute, Price, ProductId};

use super::Category;

/// A product as served by the catalog.
///
/// Listings fill only the summary fields (`description` is `None`, `images`
/// and `attributes` are empty). Detail lookups fill everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub in_stock: bool,
    pub description: Option<String>,
    /// `None` when the product has no price row.
    pub price: Option<Price>,
    /// `None` when the product has no category.
    pub category: Option<Category>,
    /// Image with the lowest id.
    pub first_image: Option<String>,
    /// All image URLs ordered by image id.
    pub images: Vec<String>,
    /// Attributes ordered by name, values in display order.
    pub attributes: Vec<Attribute>,
}

/// Aggregated attributes of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAttributes {
    pub product_id: ProductId,
    pub attributes: Vec<Attribute>,
}
