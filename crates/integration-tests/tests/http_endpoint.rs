//! Integration tests for the HTTP surface: routing, CORS, and health checks.

#![allow(clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};
use shopql_api::config::CorsOrigins;
use shopql_api::middleware::REQUEST_ID_HEADER;
use shopql_integration_tests::{test_config, test_router};
use tower::ServiceExt;

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn graphql_post(body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_post_query() {
    let (app, _) = test_router(test_config(false, CorsOrigins::Any)).unwrap();

    let response = app
        .oneshot(graphql_post(&json!({ "query": "{ categories { name } }" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["data"]["categories"],
        json!([{ "name": "all" }, { "name": "clothes" }, { "name": "tech" }])
    );
}

#[tokio::test]
async fn test_get_query_string() {
    let (app, _) = test_router(test_config(false, CorsOrigins::Any)).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/graphql?query=%7B%20categories%20%7B%20id%20%7D%20%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["categories"][0]["id"], 1);
}

#[tokio::test]
async fn test_get_refuses_mutations() {
    let (app, store) = test_router(test_config(false, CorsOrigins::Any)).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/graphql?query=mutation%7BquickAddToCart(productID:%22ps-5%22)%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");
    assert_eq!(body["data"], Value::Null);

    let lines = shopql_api::db::CartStore::lines(store.as_ref()).await.unwrap();
    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_get_runs_named_query_beside_mutation() {
    let (app, _) = test_router(test_config(false, CorsOrigins::Any)).unwrap();

    // query Cats { categories { id } } mutation Add { quickAddToCart(productID: "ps-5") }
    let uri = "/graphql?operationName=Cats&query=query%20Cats%20%7B%20categories%20%7B%20id%20%7D%20%7D%20\
               mutation%20Add%20%7B%20quickAddToCart(productID:%20%22ps-5%22)%20%7D";
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["categories"][0]["id"], 1);
}

#[tokio::test]
async fn test_mutation_with_variables() {
    let (app, store) = test_router(test_config(false, CorsOrigins::Any)).unwrap();

    let request = graphql_post(&json!({
        "query": "mutation Add($id: String!, $qty: Int!) { addToCart(productID: $id, quantity: $qty) { quantity } }",
        "variables": { "id": "ps-5", "qty": 3 },
    }));
    let body = body_json(app.oneshot(request).await.unwrap()).await;

    assert_eq!(body["data"]["addToCart"]["quantity"], 3);
    let lines = shopql_api::db::CartStore::lines(store.as_ref()).await.unwrap();
    assert_eq!(lines.len(), 1);
}

#[tokio::test]
async fn test_errors_carry_codes_over_http() {
    let (app, _) = test_router(test_config(false, CorsOrigins::Any)).unwrap();

    let body = body_json(
        app.oneshot(graphql_post(
            &json!({ "query": "mutation { DeleteCartItem(cartitemID: 99) }" }),
        ))
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(body["errors"][0]["message"], "Failed to delete cart item.");
    assert_eq!(body["errors"][0]["extensions"]["code"], "NOT_FOUND");
    assert_eq!(body["errors"][0]["path"], json!(["DeleteCartItem"]));
}

#[tokio::test]
async fn test_request_id_generated_and_echoed() {
    let (app, _) = test_router(test_config(false, CorsOrigins::Any)).unwrap();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().get(REQUEST_ID_HEADER).is_some());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(REQUEST_ID_HEADER, "req-from-proxy")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "req-from-proxy"
    );
}

#[tokio::test]
async fn test_health_checks() {
    let (app, _) = test_router(test_config(false, CorsOrigins::Any)).unwrap();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");

    // The test pool points at a closed port
    let response = app
        .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_graphiql_only_when_enabled() {
    let (app, _) = test_router(test_config(false, CorsOrigins::Any)).unwrap();
    let response = app
        .oneshot(Request::builder().uri("/graphiql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (app, _) = test_router(test_config(true, CorsOrigins::Any)).unwrap();
    let response = app
        .oneshot(Request::builder().uri("/graphiql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/graphql"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let origins = CorsOrigins::List(vec!["https://shop.example.com".to_string()]);
    let (app, _) = test_router(test_config(false, origins)).unwrap();

    let preflight = |origin: &'static str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/graphql")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(preflight("https://shop.example.com"))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://shop.example.com"
    );

    let response = app.oneshot(preflight("https://evil.example.com")).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
