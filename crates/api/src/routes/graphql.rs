//! GraphQL endpoint and IDE.

use async_graphql::{ErrorExtensions, Pos};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use crate::error::AppError;
use crate::graphql::{graphiql_page, is_mutation};
use crate::state::AppState;

/// Execute a GraphQL query or mutation from a POST JSON body.
pub async fn execute(State(state): State<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    state.schema().execute(request.into_inner()).await.into()
}

/// Execute a GraphQL query from the GET query string.
///
/// Mutations are refused with `405 Method Not Allowed` and a
/// `BAD_USER_INPUT` error body.
pub async fn execute_query(State(state): State<AppState>, request: GraphQLRequest) -> Response {
    let request = request.into_inner();
    if is_mutation(&request) {
        tracing::warn!(operation = ?request.operation_name, "Rejected mutation sent with GET");
        let error = AppError::BadRequest("Mutations must be sent with POST.".to_string())
            .extend()
            .into_server_error(Pos::default());
        let body = GraphQLResponse::from(async_graphql::Response::from_errors(vec![error]));
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")], body).into_response();
    }

    GraphQLResponse::from(state.schema().execute(request).await).into_response()
}

/// Serve the GraphiQL IDE.
pub async fn graphiql() -> Html<String> {
    Html(graphiql_page("/graphql"))
}
