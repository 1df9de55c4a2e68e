//! GraphQL schema for the catalog and cart.
//!
//! The schema is built once at startup around two storage handles and then
//! shared by every request. Storage is reached only through the
//! [`CatalogStore`] and [`CartStore`] traits so tests can run the full schema
//! against an in-memory backend.

mod mutation;
mod query;
pub mod types;

use std::sync::Arc;

use async_graphql::extensions::Tracing;
use async_graphql::http::GraphiQLSource;
use async_graphql::parser::parse_query;
use async_graphql::parser::types::OperationType;
use async_graphql::{EmptySubscription, Request, Schema};

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use crate::config::GraphqlConfig;
use crate::db::{CartStore, CatalogStore};

/// The executable schema type.
pub type ShopSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema over the given stores.
#[must_use]
pub fn build_schema(
    catalog: Arc<dyn CatalogStore>,
    cart: Arc<dyn CartStore>,
    config: &GraphqlConfig,
) -> ShopSchema {
    let query = QueryRoot {
        catalog,
        cart: Arc::clone(&cart),
    };
    let mutation = MutationRoot { cart };

    Schema::build(query, mutation, EmptySubscription)
        .limit_depth(config.max_depth)
        .extension(Tracing)
        .finish()
}

/// HTML for the GraphiQL IDE pointed at `endpoint`.
#[must_use]
pub fn graphiql_page(endpoint: &str) -> String {
    GraphiQLSource::build().endpoint(endpoint).finish()
}

/// Whether executing `request` could run a mutation.
///
/// Considers the operation selected by `operationName`, or every operation in
/// the document when no name is given. Documents that fail to parse report
/// `false`; execution returns the syntax error.
#[must_use]
pub fn is_mutation(request: &Request) -> bool {
    let Ok(document) = parse_query(&request.query) else {
        return false;
    };
    let wanted = request.operation_name.as_deref();

    document
        .operations
        .iter()
        .filter(|(name, _)| wanted.is_none_or(|w| name.is_some_and(|n| n.as_str() == w)))
        .any(|(_, operation)| operation.node.ty == OperationType::Mutation)
}
