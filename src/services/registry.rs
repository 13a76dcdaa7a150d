//! Tracked-currency registry
//!
//! Add (with reactivation of removed symbols), soft removal, and the
//! active listing consumed by the ingestion loop.

use std::sync::Arc;
use tracing::info;

use crate::error::TrackerError;
use crate::models::currency::{AddOutcome, Currency, CurrencySelector, Symbol};
use crate::store::{PriceStore, StoreError};

#[derive(Clone)]
pub struct CurrencyRegistry {
    store: Arc<dyn PriceStore>,
}

impl CurrencyRegistry {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }

    /// Register a symbol.
    ///
    /// An active currency with the same symbol is a `Conflict`. A removed
    /// one is reactivated in place, keeping its id and price history.
    pub async fn add(&self, symbol: &Symbol) -> Result<AddOutcome, TrackerError> {
        let conflict = || TrackerError::Conflict("Currency already exists".to_string());

        match self.store.find_currency_by_symbol(symbol).await? {
            Some(existing) if existing.status.is_active() => Err(conflict()),
            Some(existing) => {
                // None: a concurrent add restored it first
                let restored = self
                    .store
                    .restore_currency(existing.id)
                    .await?
                    .ok_or_else(conflict)?;
                info!(symbol = %symbol, id = restored.id, "Tracked currency restored");
                Ok(AddOutcome::Restored(restored))
            }
            None => match self.store.insert_currency(symbol).await {
                Ok(created) => {
                    info!(symbol = %symbol, id = created.id, "Tracked currency added");
                    Ok(AddOutcome::Created(created))
                }
                Err(StoreError::Duplicate(_)) => Err(conflict()),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Soft-delete the matching active currency
    pub async fn remove(&self, selector: &CurrencySelector) -> Result<(), TrackerError> {
        if !self.store.deactivate_currency(selector).await? {
            return Err(TrackerError::NotFound("Currency not found".to_string()));
        }

        info!(selector = %selector, "Tracked currency removed");
        Ok(())
    }

    pub async fn list_active(&self) -> Result<Vec<Currency>, TrackerError> {
        Ok(self.store.list_active_currencies().await?)
    }
}
