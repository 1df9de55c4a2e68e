//! Query root: catalog lookups and the cart view.

use std::sync::Arc;

use async_graphql::{Object, Result, ResultExt};

use shopql_core::ProductId;

use super::types::{CartItemObject, CategoryObject, ProductAttributesObject, ProductObject};
use crate::db::{CartStore, CatalogStore};
use crate::error::AppError;

/// The root GraphQL query type.
pub struct QueryRoot {
    pub(crate) catalog: Arc<dyn CatalogStore>,
    pub(crate) cart: Arc<dyn CartStore>,
}

#[Object]
impl QueryRoot {
    /// All categories.
    async fn categories(&self) -> Result<Vec<CategoryObject>> {
        let categories = self.catalog.categories().await.map_err(AppError::from).extend()?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Product listings, optionally restricted to one category by exact name.
    async fn products(&self, category_name: Option<String>) -> Result<Vec<ProductObject>> {
        let products = self
            .catalog
            .products(category_name.as_deref())
            .await
            .map_err(AppError::from)
            .extend()?;
        Ok(products.into_iter().map(ProductObject).collect())
    }

    /// Full product detail: gallery, description, and ordered attributes.
    async fn product_details(&self, id: String) -> Result<ProductObject> {
        let product_id = ProductId::from(id);
        self.catalog
            .product_details(&product_id)
            .await
            .map_err(AppError::from)
            .and_then(|product| {
                product.ok_or_else(|| AppError::NotFound(format!("Product {product_id} not found")))
            })
            .map(ProductObject)
            .extend()
    }

    /// Current cart lines.
    async fn cart(&self) -> Result<Vec<CartItemObject>> {
        let lines = self.cart.lines().await.map_err(AppError::from).extend()?;
        Ok(lines.into_iter().map(CartItemObject).collect())
    }

    /// Attributes of every product.
    async fn get_all_attributes(&self) -> Result<Vec<ProductAttributesObject>> {
        let attributes = self.catalog.all_attributes().await.map_err(AppError::from).extend()?;
        Ok(attributes.into_iter().map(Into::into).collect())
    }
}
