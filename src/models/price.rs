//! Price sample domain types and the point-in-time price models
//!
//! Models for GET /api/v1/currency/price.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::Symbol;

/// Fractional digits kept for stored prices
pub const PRICE_SCALE: u32 = 8;

/// One immutable price observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSample {
    pub id: i64,
    pub currency_id: i64,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Truncate to the microsecond precision of the backing store
pub fn storage_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Price resolved for a symbol at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub symbol: Symbol,
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRequest {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
}

/// `price` goes out as a JSON number: the nearest `f64`. Every `Decimal`
/// (96-bit mantissa, scale <= 28) lies inside the `f64` range, so the
/// conversion always has a value.
#[derive(Debug, Clone, Serialize)]
pub struct PriceResponse {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<PriceQuote> for PriceResponse {
    fn from(quote: PriceQuote) -> Self {
        Self {
            symbol: quote.symbol.to_string(),
            price: quote.price,
        }
    }
}
