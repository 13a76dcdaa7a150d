use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use super::currency::invalid_body;
use crate::AppState;
use crate::error::TrackerError;
use crate::models::currency::Symbol;
use crate::models::price::{PriceRequest, PriceResponse};

/// GET /api/v1/currency/price
///
/// Body `{"symbol": "BTC", "timestamp": "2024-05-01T12:00:00Z"}`. Returns the
/// exact sample if one exists, otherwise the nearest one.
pub async fn get_price_at_time(
    State(state): State<AppState>,
    payload: Result<Json<PriceRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>, TrackerError> {
    let Json(payload) = payload.map_err(invalid_body)?;
    let symbol = Symbol::parse(&payload.symbol)?;

    info!(symbol = %symbol, timestamp = %payload.timestamp, "Price lookup");

    let quote = state.prices.lookup(&symbol, payload.timestamp).await?;
    Ok(Json(PriceResponse::from(quote)))
}
