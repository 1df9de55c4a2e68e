//! Category model.

use serde::{Deserialize, Serialize};

use shopql_core::CategoryId;

/// A product category (static reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
