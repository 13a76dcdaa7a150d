//! Error taxonomy shared by the registry, the lookup engine and the
//! HTTP boundary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::error::ErrorResponse;
use crate::services::price_feed::FeedError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Malformed or missing input
    #[error("{0}")]
    InvalidArgument(String),
    /// Symbol already tracked by an active currency
    #[error("{0}")]
    Conflict(String),
    /// Unknown currency or no price data
    #[error("{0}")]
    NotFound(String),
    /// Price feed fetch failed; only produced on the ingestion path
    #[error("price feed unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FeedError> for TrackerError {
    fn from(e: FeedError) -> Self {
        TrackerError::UpstreamUnavailable(e.to_string())
    }
}

impl TrackerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            TrackerError::Conflict(_) => StatusCode::CONFLICT,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            TrackerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to HTTP callers; store details stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            TrackerError::Store(_) => "Database error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        if let TrackerError::Store(e) = &self {
            error!(error = %e, "Store error while handling request");
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
