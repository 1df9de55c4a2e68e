//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::graphql::ShopSchema;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    schema: ShopSchema,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The pool is only used for readiness checks; all data access goes
    /// through the stores the schema was built with.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool, schema: ShopSchema) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                schema,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the executable GraphQL schema.
    #[must_use]
    pub fn schema(&self) -> &ShopSchema {
        &self.inner.schema
    }
}
