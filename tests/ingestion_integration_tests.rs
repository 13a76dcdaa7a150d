use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use price_tracker::{
    config::FeedConfig,
    jobs::price_ingestion::{PriceIngestionJob, TickReport},
    models::currency::Symbol,
    services::price_feed::{BinanceTickerFeed, FeedError, PriceFeed},
    store::{InMemoryStore, PriceStore},
};
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
struct TickerQuery {
    symbol: String,
}

/// Stand-in for the ticker endpoint of the exchange
async fn ticker_price(Query(query): Query<TickerQuery>) -> Response {
    match query.symbol.as_str() {
        "BTCUSDT" => Json(json!({"symbol": "BTCUSDT", "price": "65000.12345678"})).into_response(),
        "SOLUSDT" => Json(json!({"symbol": "SOLUSDT", "price": "not-a-number"})).into_response(),
        "ADAUSDT" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        "DOTUSDT" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"symbol": "DOTUSDT", "price": "7.5"})).into_response()
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"code": -1, "msg": "internal error"})),
        )
            .into_response(),
    }
}

async fn spawn_fake_feed() -> String {
    let app = Router::new().route("/api/v3/ticker/price", get(ticker_price));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn feed_config(base_url: &str) -> FeedConfig {
    FeedConfig {
        base_url: base_url.to_string(),
        poll_interval: Duration::from_secs(3600),
        quote_currency: "USDT".to_string(),
        fetch_timeout: Duration::from_millis(500),
    }
}

#[tokio::test]
async fn test_feed_client_parses_ticker() {
    let base_url = spawn_fake_feed().await;
    let feed = BinanceTickerFeed::new(&base_url, Duration::from_secs(2)).unwrap();

    assert_eq!(
        feed.fetch_price("BTCUSDT").await.unwrap(),
        dec!(65000.12345678)
    );
}

#[tokio::test]
async fn test_feed_client_error_kinds() {
    let base_url = spawn_fake_feed().await;
    let feed = BinanceTickerFeed::new(&base_url, Duration::from_millis(300)).unwrap();

    assert!(matches!(
        feed.fetch_price("ETHUSDT").await,
        Err(FeedError::Status { code: 500 })
    ));
    assert!(matches!(
        feed.fetch_price("SOLUSDT").await,
        Err(FeedError::Payload(_))
    ));
    assert!(matches!(
        feed.fetch_price("ADAUSDT").await,
        Err(FeedError::Payload(_))
    ));
    assert!(matches!(
        feed.fetch_price("DOTUSDT").await,
        Err(FeedError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_feed_client_unreachable_host() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let feed = BinanceTickerFeed::new(&format!("http://{}", addr), Duration::from_secs(1)).unwrap();
    assert!(feed.fetch_price("BTCUSDT").await.is_err());
}

/// BTC succeeds, ETH gets HTTP 500: only BTC gains a sample
#[tokio::test]
async fn test_tick_against_feed_with_one_failure() {
    let base_url = spawn_fake_feed().await;
    let config = feed_config(&base_url);
    let store = Arc::new(InMemoryStore::new());

    let btc = store
        .insert_currency(&Symbol::parse("BTC").unwrap())
        .await
        .unwrap();
    let eth = store
        .insert_currency(&Symbol::parse("ETH").unwrap())
        .await
        .unwrap();

    let feed = Arc::new(BinanceTickerFeed::new(&config.base_url, config.fetch_timeout).unwrap());
    let job = PriceIngestionJob::new(store.clone(), feed, &config);

    let report = job.run_tick().await;
    assert_eq!(
        report,
        TickReport {
            tracked: 2,
            stored: 1,
            failed: 1
        }
    );
    assert_eq!(store.sample_count(btc.id), 1);
    assert_eq!(store.sample_count(eth.id), 0);

    let sample = store
        .sample_before(btc.id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sample.price, dec!(65000.12345678));

    // The next tick runs normally
    let report = job.run_tick().await;
    assert_eq!(report.stored, 1);
    assert_eq!(store.sample_count(btc.id), 2);
}

#[tokio::test]
async fn test_slow_currency_does_not_block_tick() {
    let base_url = spawn_fake_feed().await;
    let config = feed_config(&base_url);
    let store = Arc::new(InMemoryStore::new());

    for symbol in ["BTC", "DOT", "SOL", "ADA"] {
        store
            .insert_currency(&Symbol::parse(symbol).unwrap())
            .await
            .unwrap();
    }

    let feed = Arc::new(BinanceTickerFeed::new(&config.base_url, Duration::from_secs(30)).unwrap());
    let job = PriceIngestionJob::new(store, feed, &config);

    let report = tokio::time::timeout(Duration::from_secs(3), job.run_tick())
        .await
        .expect("tick must be bounded by the fetch timeout");
    assert_eq!(
        report,
        TickReport {
            tracked: 4,
            stored: 1,
            failed: 3
        }
    );
}
