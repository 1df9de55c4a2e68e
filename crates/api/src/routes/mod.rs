//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET  /graphql       - Execute a query from the query string (no mutations)
//! POST /graphql       - Execute a query or mutation from a JSON body
//! GET  /graphiql      - GraphiQL IDE (only when enabled)
//! GET  /health        - Liveness
//! GET  /health/ready  - Readiness (database reachable)
//! ```

pub mod graphql;
pub mod health;

use axum::http::{HeaderValue, Method, header};
use axum::{Router, extract::Request, middleware, routing::get};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigins;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the CORS layer for the configured origins.
///
/// Origins that are not valid header values are skipped with a warning.
#[must_use]
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn router(state: AppState) -> Router {
    let mut routes = Router::new()
        .route("/graphql", get(graphql::execute_query).post(graphql::execute))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness));

    if state.config().graphql.graphiql {
        routes = routes.route("/graphiql", get(graphql::graphiql));
    }

    let cors = cors_layer(&state.config().cors_origins);

    routes
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
        .with_state(state)
}
