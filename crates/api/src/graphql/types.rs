//! GraphQL output types.
//!
//! Field names are part of the public contract and stay snake_case
//! (`product_id`, `in_stock`, `first_image`, ...) as existing clients expect.
//! Cart items keep their historical `cartitemID` / `productID` spellings.

use async_graphql::{Object, SimpleObject};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use shopql_core::Attribute;

use crate::models::{CartLine, Category, Product, ProductAttributes};

/// Decimal amounts are exposed as GraphQL `Float`.
fn to_float(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

/// A product category.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Category")]
pub struct CategoryObject {
    pub id: i32,
    pub name: String,
}

impl From<Category> for CategoryObject {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.as_i32(),
            name: category.name,
        }
    }
}

/// A named product attribute and its selectable values.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Attribute")]
pub struct AttributeObject {
    pub name: String,
    pub values: Vec<String>,
}

impl From<Attribute> for AttributeObject {
    fn from(attribute: Attribute) -> Self {
        Self {
            name: attribute.name,
            values: attribute.values,
        }
    }
}

/// All attributes of one product.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "ProductAttributes", rename_fields = "snake_case")]
pub struct ProductAttributesObject {
    pub product_id: String,
    pub attributes: Vec<AttributeObject>,
}

impl From<ProductAttributes> for ProductAttributesObject {
    fn from(value: ProductAttributes) -> Self {
        Self {
            product_id: value.product_id.into(),
            attributes: value.attributes.into_iter().map(Into::into).collect(),
        }
    }
}

/// A catalog product.
pub struct ProductObject(pub Product);

#[Object(name = "Product", rename_fields = "snake_case")]
impl ProductObject {
    async fn product_id(&self) -> &str {
        self.0.id.as_str()
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn in_stock(&self) -> bool {
        self.0.in_stock
    }

    /// Only filled by `productDetails`.
    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn price(&self) -> Option<f64> {
        self.0.price.as_ref().map(|p| to_float(p.amount))
    }

    async fn currency_label(&self) -> Option<&str> {
        self.0.price.as_ref().map(|p| p.currency.label.as_str())
    }

    async fn currency_symbol(&self) -> Option<&str> {
        self.0.price.as_ref().map(|p| p.currency.symbol.as_str())
    }

    async fn category(&self) -> Option<CategoryObject> {
        self.0.category.clone().map(Into::into)
    }

    async fn first_image(&self) -> Option<&str> {
        self.0.first_image.as_deref()
    }

    /// All gallery images, in upload order. Only filled by `productDetails`.
    async fn images(&self) -> Vec<String> {
        self.0.images.clone()
    }

    /// Only filled by `productDetails`.
    async fn attributes(&self) -> Vec<AttributeObject> {
        self.0
            .attributes
            .iter()
            .cloned()
            .map(AttributeObject::from)
            .collect()
    }
}

/// A cart line with product name, unit price, and first image.
pub struct CartItemObject(pub CartLine);

#[Object(name = "CartItem", rename_fields = "snake_case")]
impl CartItemObject {
    #[graphql(name = "cartitemID")]
    async fn cart_item_id(&self) -> i32 {
        self.0.id.as_i32()
    }

    #[graphql(name = "productID")]
    async fn product_id(&self) -> &str {
        self.0.product_id.as_str()
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn price_per_unit(&self) -> f64 {
        to_float(self.0.unit_price.amount)
    }

    async fn quantity(&self) -> i32 {
        self.0.quantity
    }

    async fn currency_symbol(&self) -> &str {
        &self.0.unit_price.currency.symbol
    }

    async fn color(&self) -> Option<&str> {
        self.0.options.color.as_deref()
    }

    async fn size(&self) -> Option<&str> {
        self.0.options.size.as_deref()
    }

    async fn capacity(&self) -> Option<&str> {
        self.0.options.capacity.as_deref()
    }

    async fn usb_port(&self) -> Option<&str> {
        self.0.options.usb_port.as_deref()
    }

    async fn touch_id(&self) -> Option<&str> {
        self.0.options.touch_id.as_deref()
    }

    async fn first_image(&self) -> Option<&str> {
        self.0.first_image.as_deref()
    }
}
