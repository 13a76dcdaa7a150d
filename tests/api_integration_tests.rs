mod common;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use price_tracker::{
    models::currency::Symbol,
    store::{InMemoryStore, PriceStore},
};
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;

use crate::common::{build_test_router, send_json};

const ADD: &str = "/api/v1/currency/add";
const REMOVE: &str = "/api/v1/currency/remove";
const PRICE: &str = "/api/v1/currency/price";

#[tokio::test]
async fn test_add_currency_created() {
    let app = build_test_router(Arc::new(InMemoryStore::new()));

    let (status, body) = send_json(&app, "POST", ADD, r#"{"symbol":"BTC"}"#).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["symbol"], "BTC");
    assert_eq!(body["active"], true);
    assert!(body["id"].is_i64());
}

#[tokio::test]
async fn test_add_currency_twice_conflicts() {
    let app = build_test_router(Arc::new(InMemoryStore::new()));

    send_json(&app, "POST", ADD, r#"{"symbol":"BTC"}"#).await;
    let (status, body) = send_json(&app, "POST", ADD, r#"{"symbol":"BTC"}"#).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "Currency already exists"}));
}

#[tokio::test]
async fn test_add_currency_validation() {
    let app = build_test_router(Arc::new(InMemoryStore::new()));

    let (status, body) = send_json(&app, "POST", ADD, r#"{"symbol":"btc"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send_json(&app, "POST", ADD, r#"{"symbol":"VERYLONGSYMBOL"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(&app, "POST", ADD, "not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid request body"}));

    let (status, _) = send_json(&app, "POST", ADD, "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_requires_selector() {
    let app = build_test_router(Arc::new(InMemoryStore::new()));

    let (status, body) = send_json(&app, "POST", REMOVE, "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Must provide either id or symbol"}));
}

#[tokio::test]
async fn test_remove_by_id_and_symbol() {
    let app = build_test_router(Arc::new(InMemoryStore::new()));

    let (_, btc) = send_json(&app, "POST", ADD, r#"{"symbol":"BTC"}"#).await;
    send_json(&app, "POST", ADD, r#"{"symbol":"ETH"}"#).await;

    let by_id = json!({"id": btc["id"]}).to_string();
    let (status, body) = send_json(&app, "POST", REMOVE, &by_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Currency successfully deleted");

    let (status, _) = send_json(&app, "POST", REMOVE, r#"{"symbol":"ETH"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "POST", REMOVE, r#"{"symbol":"ETH"}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Currency not found"}));
}

#[tokio::test]
async fn test_remove_then_add_restores_history() {
    let store = Arc::new(InMemoryStore::new());
    let app = build_test_router(store.clone());
    let t = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let (status, created) = send_json(&app, "POST", ADD, r#"{"symbol":"ETH"}"#).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    store.append_sample(id, dec!(3500.5), t).await.unwrap();

    let lookup = json!({"symbol": "ETH", "timestamp": t}).to_string();
    let (_, before_cycle) = send_json(&app, "GET", PRICE, &lookup).await;

    send_json(&app, "POST", REMOVE, r#"{"symbol":"ETH"}"#).await;

    // History of a removed currency stays queryable
    let (status, while_removed) = send_json(&app, "GET", PRICE, &lookup).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(while_removed, before_cycle);

    let (status, restored) = send_json(&app, "POST", ADD, r#"{"symbol":"ETH"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["id"].as_i64(), Some(id));
    assert_eq!(restored["active"], true);

    let (_, after_cycle) = send_json(&app, "GET", PRICE, &lookup).await;
    assert_eq!(after_cycle, before_cycle);
    assert_eq!(after_cycle["price"], 3500.5);
}

#[tokio::test]
async fn test_price_nearest_and_exact() {
    let store = Arc::new(InMemoryStore::new());
    let app = build_test_router(store.clone());
    let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let id = store
        .insert_currency(&Symbol::parse("BTC").unwrap())
        .await
        .unwrap()
        .id;
    store
        .append_sample(id, dec!(64000), t - Duration::seconds(5))
        .await
        .unwrap();
    store
        .append_sample(id, dec!(65000.12345678), t + Duration::seconds(3))
        .await
        .unwrap();
    store
        .append_sample(id, dec!(66000), t + Duration::seconds(13))
        .await
        .unwrap();

    let (status, body) = send_json(
        &app,
        "GET",
        PRICE,
        &json!({"symbol": "BTC", "timestamp": t}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "BTC");
    assert_eq!(body["price"], 65000.12345678);

    // Equidistant from +3s and +13s
    let (_, body) = send_json(
        &app,
        "GET",
        PRICE,
        &json!({"symbol": "BTC", "timestamp": t + Duration::seconds(8)}).to_string(),
    )
    .await;
    assert_eq!(body["price"], 66000.0);

    let (_, body) = send_json(
        &app,
        "GET",
        PRICE,
        &json!({"symbol": "BTC", "timestamp": t - Duration::seconds(5)}).to_string(),
    )
    .await;
    assert_eq!(body["price"], 64000.0);
}

#[tokio::test]
async fn test_price_not_found_cases() {
    let store = Arc::new(InMemoryStore::new());
    let app = build_test_router(store.clone());
    store
        .insert_currency(&Symbol::parse("SOL").unwrap())
        .await
        .unwrap();

    let (status, body) = send_json(
        &app,
        "GET",
        PRICE,
        r#"{"symbol":"SOL","timestamp":"2024-06-01T00:00:00Z"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "No price data available"}));

    let (status, body) = send_json(
        &app,
        "GET",
        PRICE,
        r#"{"symbol":"XRP","timestamp":"2024-06-01T00:00:00Z"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Currency not found"}));
}

#[tokio::test]
async fn test_price_invalid_body() {
    let app = build_test_router(Arc::new(InMemoryStore::new()));

    let (status, _) = send_json(&app, "GET", PRICE, r#"{"symbol":"BTC"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "GET",
        PRICE,
        r#"{"symbol":"BTC","timestamp":"yesterday"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
