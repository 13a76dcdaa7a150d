//! Ticker price feed client
//!
//! Talks to a Binance-compatible `GET /api/v3/ticker/price?symbol=<PAIR>`
//! endpoint returning `{"symbol": "...", "price": "..."}`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected status code {code}")]
    Status { code: u16 },
    #[error("malformed payload: {0}")]
    Payload(String),
}

/// Source of the latest price for a trading pair
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_price(&self, trading_pair: &str) -> Result<Decimal, FeedError>;
}

#[derive(Debug, Deserialize)]
struct TickerPriceResponse {
    symbol: String,
    price: String,
}

/// Parse a ticker price string such as `"65000.12345678"`
pub fn parse_price(raw: &str) -> Result<Decimal, FeedError> {
    let price = Decimal::from_str(raw.trim())
        .map_err(|e| FeedError::Payload(format!("invalid price '{}': {}", raw, e)))?;

    if price.is_sign_negative() {
        return Err(FeedError::Payload(format!("negative price '{}'", raw)));
    }

    Ok(price)
}

#[derive(Clone)]
pub struct BinanceTickerFeed {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl BinanceTickerFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl PriceFeed for BinanceTickerFeed {
    async fn fetch_price(&self, trading_pair: &str) -> Result<Decimal, FeedError> {
        let url = format!("{}{}", self.base_url, TICKER_PRICE_PATH);
        debug!(url = %url, pair = %trading_pair, "Fetching ticker price");

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&[("symbol", trading_pair)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::Timeout(self.timeout)
                } else {
                    FeedError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FeedError::Status {
                code: status.as_u16(),
            });
        }

        let ticker: TickerPriceResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Payload(e.to_string()))?;

        if !ticker.symbol.eq_ignore_ascii_case(trading_pair) {
            debug!(
                requested = %trading_pair,
                returned = %ticker.symbol,
                "Feed answered with a different symbol"
            );
        }

        parse_price(&ticker.price)
    }
}
