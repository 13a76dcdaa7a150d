use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::AppState;
use crate::handlers::{currency, price};

pub const ADD_CURRENCY_PATH: &str = "/api/v1/currency/add";
pub const REMOVE_CURRENCY_PATH: &str = "/api/v1/currency/remove";
pub const PRICE_PATH: &str = "/api/v1/currency/price";

pub fn build_router(state: AppState) -> Router {
    info!("POST {}", ADD_CURRENCY_PATH);
    info!("POST {}", REMOVE_CURRENCY_PATH);
    info!("GET {}", PRICE_PATH);

    Router::new()
        .route(ADD_CURRENCY_PATH, post(currency::add_currency))
        .route(REMOVE_CURRENCY_PATH, post(currency::remove_currency))
        .route(PRICE_PATH, get(price::get_price_at_time))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
