//! Nearest-timestamp price lookup
//!
//! Resolves a symbol (active or removed) to its price at a point in time:
//! an exact sample when one exists, otherwise the closer of the nearest
//! samples on either side. Each probe is a single indexed query on
//! `(currency_id, timestamp)`.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::error::TrackerError;
use crate::models::currency::Symbol;
use crate::models::price::{PriceQuote, PriceSample, storage_precision};
use crate::store::PriceStore;

#[derive(Clone)]
pub struct PriceLookupService {
    store: Arc<dyn PriceStore>,
}

impl PriceLookupService {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }

    pub async fn lookup(
        &self,
        symbol: &Symbol,
        target: DateTime<Utc>,
    ) -> Result<PriceQuote, TrackerError> {
        let currency = self
            .store
            .find_currency_by_symbol(symbol)
            .await?
            .ok_or_else(|| TrackerError::NotFound("Currency not found".to_string()))?;

        let target = storage_precision(target);

        if let Some(exact) = self.store.sample_at(currency.id, target).await? {
            debug!(symbol = %symbol, target = %target, "Exact price sample hit");
            return Ok(PriceQuote {
                symbol: symbol.clone(),
                price: exact.price,
            });
        }

        let (before, after) = tokio::try_join!(
            self.store.sample_before(currency.id, target),
            self.store.sample_after(currency.id, target),
        )?;

        let nearest = select_nearest(target, before, after)
            .ok_or_else(|| TrackerError::NotFound("No price data available".to_string()))?;

        debug!(
            symbol = %symbol,
            target = %target,
            sample_timestamp = %nearest.timestamp,
            "Nearest price sample selected"
        );

        Ok(PriceQuote {
            symbol: symbol.clone(),
            price: nearest.price,
        })
    }
}

/// Pick the sample closest to `target`.
///
/// `before` wins only when strictly closer; equal distances resolve to
/// `after`. This asymmetry is kept as observed behaviour even though it
/// looks like an artifact of a strict comparison.
pub fn select_nearest(
    target: DateTime<Utc>,
    before: Option<PriceSample>,
    after: Option<PriceSample>,
) -> Option<PriceSample> {
    match (before, after) {
        (None, None) => None,
        (Some(before), None) => Some(before),
        (None, Some(after)) => Some(after),
        (Some(before), Some(after)) => {
            if target - before.timestamp < after.timestamp - target {
                Some(before)
            } else {
                Some(after)
            }
        }
    }
}
