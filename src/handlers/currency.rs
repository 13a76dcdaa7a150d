//! Currency registry handlers
//!
//! POST /api/v1/currency/add and POST /api/v1/currency/remove.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::warn;

use crate::AppState;
use crate::error::TrackerError;
use crate::models::currency::{
    AddCurrencyRequest, AddOutcome, CurrencyResponse, MessageResponse, RemoveCurrencyRequest,
    Symbol,
};

pub(crate) fn invalid_body(rejection: JsonRejection) -> TrackerError {
    warn!(error = %rejection.body_text(), "Invalid request body");
    TrackerError::InvalidArgument("Invalid request body".to_string())
}

/// POST /api/v1/currency/add
///
/// # Response
/// - 201: currency created
/// - 200: previously removed currency restored
/// - 400: invalid body or symbol
/// - 409: currency already tracked
/// - 500: database error
pub async fn add_currency(
    State(state): State<AppState>,
    payload: Result<Json<AddCurrencyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CurrencyResponse>), TrackerError> {
    let Json(payload) = payload.map_err(invalid_body)?;
    let symbol = Symbol::parse(&payload.symbol)?;

    let outcome = state.registry.add(&symbol).await?;
    let status = match outcome {
        AddOutcome::Created(_) => StatusCode::CREATED,
        AddOutcome::Restored(_) => StatusCode::OK,
    };

    Ok((status, Json(CurrencyResponse::from(outcome.currency()))))
}

/// POST /api/v1/currency/remove
///
/// Accepts `{"id": 1}` or `{"symbol": "BTC"}`; `id` wins when both are set.
pub async fn remove_currency(
    State(state): State<AppState>,
    payload: Result<Json<RemoveCurrencyRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, TrackerError> {
    let Json(payload) = payload.map_err(invalid_body)?;
    let selector = payload.selector()?;

    state.registry.remove(&selector).await?;

    Ok(Json(MessageResponse {
        message: "Currency successfully deleted".to_string(),
    }))
}
