//! Integration tests for the `PostgreSQL` repositories.
//!
//! These tests require a `PostgreSQL` 15+ database in
//! `SHOPQL_TEST_DATABASE_URL`; its catalog, cart, and orders are wiped.
//!
//! Run with: cargo test -p shopql-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use serde_json::{Value, json};
use shopql_api::db::CartStore;
use shopql_core::{CartItemId, OrderId};
use shopql_integration_tests::{PgContext, first_error_code, first_error_message};

const CART: &str = "{ cart { cartitemID productID quantity color size capacity usb_port touch_id } }";

async fn cart(ctx: &PgContext) -> Vec<Value> {
    ctx.execute(CART).await["data"]["cart"]
        .as_array()
        .unwrap()
        .clone()
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_seeded_attribute_order() {
    let ctx = PgContext::new().await.unwrap();

    let response = ctx
        .execute(r#"{ productDetails(id: "jacket-canada-goosee") { attributes { name values } } }"#)
        .await;
    assert_eq!(
        response["data"]["productDetails"]["attributes"],
        json!([{ "name": "Size", "values": ["Small", "Medium", "Large"] }])
    );

    let response = ctx
        .execute(r#"{ productDetails(id: "apple-iphone-12-pro") { attributes { name values } } }"#)
        .await;
    assert_eq!(
        response["data"]["productDetails"]["attributes"],
        json!([
            { "name": "Capacity", "values": ["256GB", "512GB", "1TB"] },
            { "name": "Color", "values": ["Blue", "Red"] },
        ])
    );
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_listing_and_details() {
    let ctx = PgContext::new().await.unwrap();

    let response = ctx
        .execute(r#"{ products(categoryName: "clothes") { product_id first_image } }"#)
        .await;
    assert_eq!(
        response["data"]["products"],
        json!([
            { "product_id": "huarache-x-stussy-le", "first_image": "https://cdn.example.com/huarache/1.jpg" },
            { "product_id": "jacket-canada-goosee", "first_image": null },
        ])
    );

    let response = ctx
        .execute(r#"{ productDetails(id: "unpriced-sample") { product_id } }"#)
        .await;
    assert_eq!(first_error_code(&response), Some("NOT_FOUND"));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_repeated_add_without_options_is_one_line() {
    let ctx = PgContext::new().await.unwrap();
    let add = r#"mutation { addToCart(productID: "xbox-series-s", quantity: 2) { cartitemID quantity } }"#;

    let first = ctx.execute(add).await;
    let second = ctx.execute(add).await;

    assert_eq!(first["data"]["addToCart"], json!({ "cartitemID": 1, "quantity": 2 }));
    assert_eq!(second["data"]["addToCart"], json!({ "cartitemID": 1, "quantity": 4 }));
    assert_eq!(ctx.cart_row_count().await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_options_separate_lines() {
    let ctx = PgContext::new().await.unwrap();
    ctx.execute(r#"mutation { addToCart(productID: "ps-5", quantity: 1, color: "Green") { cartitemID } }"#)
        .await;
    ctx.execute(r#"mutation { addToCart(productID: "ps-5", quantity: 1) { cartitemID } }"#)
        .await;

    let colors: Vec<Value> = cart(&ctx).await.iter().map(|l| l["color"].clone()).collect();
    assert_eq!(colors, vec![json!("Green"), Value::Null]);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_quick_add_defaults() {
    let ctx = PgContext::new().await.unwrap();

    let first = ctx
        .execute(r#"mutation { quickAddToCart(productID: "apple-imac-2021") }"#)
        .await;
    let second = ctx
        .execute(r#"mutation { quickAddToCart(productID: "apple-imac-2021") }"#)
        .await;
    assert_eq!(first["data"]["quickAddToCart"], second["data"]["quickAddToCart"]);

    let lines = cart(&ctx).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
    assert_eq!(lines[0]["capacity"], "256GB");
    assert_eq!(lines[0]["usb_port"], "No");
    assert_eq!(lines[0]["touch_id"], "No");
    assert_eq!(lines[0]["color"], Value::Null);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_quantity_overflow_is_bad_input() {
    let ctx = PgContext::new().await.unwrap();
    ctx.execute(r#"mutation { addToCart(productID: "ps-5", quantity: 2) { cartitemID } }"#)
        .await;

    let response = ctx
        .execute(r#"mutation { addToCart(productID: "ps-5", quantity: 2147483647) { cartitemID } }"#)
        .await;
    assert_eq!(first_error_code(&response), Some("BAD_USER_INPUT"));
    assert_eq!(
        first_error_message(&response),
        Some("Cart item quantity is too large.")
    );
    assert_eq!(cart(&ctx).await[0]["quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_update_and_delete() {
    let ctx = PgContext::new().await.unwrap();
    ctx.execute(r#"mutation { quickAddToCart(productID: "ps-5") }"#)
        .await;

    let response = ctx
        .execute("mutation { UpdateCartItem(cartitemID: 1, quantity: 7) }")
        .await;
    assert_eq!(response["data"]["UpdateCartItem"], 1);
    assert_eq!(
        ctx.cart.line(CartItemId::new(1)).await.unwrap().unwrap().quantity,
        7
    );

    let response = ctx
        .execute("mutation { UpdateCartItem(cartitemID: 42, quantity: 1) }")
        .await;
    assert_eq!(first_error_code(&response), Some("NOT_FOUND"));

    let response = ctx.execute("mutation { DeleteCartItem(cartitemID: 1) }").await;
    assert_eq!(response["data"]["DeleteCartItem"], 1);
    assert!(ctx.cart.line(CartItemId::new(1)).await.unwrap().is_none());
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_place_order_snapshots_cart() {
    let ctx = PgContext::new().await.unwrap();
    ctx.execute(r#"mutation { addToCart(productID: "ps-5", quantity: 2, color: "Cyan") { cartitemID } }"#)
        .await;

    let response = ctx.execute("mutation { placeOrder(total: 1688.04) }").await;
    let order_id = i32::try_from(response["data"]["placeOrder"].as_i64().unwrap()).unwrap();
    assert!(cart(&ctx).await.is_empty());

    let order = ctx.cart.order(OrderId::new(order_id)).await.unwrap().unwrap();
    assert_eq!(order.total, Decimal::new(168_804, 2));
    assert_eq!(order.details.len(), 1);
    assert_eq!(order.details[0].product_id.as_str(), "ps-5");
    assert_eq!(order.details[0].quantity, 2);
    assert_eq!(order.details[0].color.as_deref(), Some("Cyan"));
    assert_eq!(order.details[0].price_per_unit, Decimal::new(84_402, 2));

    assert!(ctx.cart.order(OrderId::new(order_id + 1)).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_failed_cart_clear_rolls_back_order() {
    let ctx = PgContext::new().await.unwrap();
    ctx.execute(r#"mutation { quickAddToCart(productID: "ps-5") }"#)
        .await;
    ctx.fail_cart_clear().await.unwrap();

    let response = ctx.execute("mutation { placeOrder(total: 844.02) }").await;
    assert_eq!(first_error_code(&response), Some("INTERNAL_SERVER_ERROR"));

    assert_eq!(ctx.order_count().await.unwrap(), 0);
    assert_eq!(ctx.cart_row_count().await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_total_beyond_column_is_bad_input() {
    let ctx = PgContext::new().await.unwrap();
    ctx.execute(r#"mutation { quickAddToCart(productID: "ps-5") }"#)
        .await;

    let response = ctx.execute("mutation { placeOrder(total: 99999999999.0) }").await;
    assert_eq!(first_error_code(&response), Some("BAD_USER_INPUT"));
    assert_eq!(ctx.order_count().await.unwrap(), 0);
    assert_eq!(ctx.cart_row_count().await.unwrap(), 1);
}
