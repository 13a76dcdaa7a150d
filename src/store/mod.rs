//! Persistence seam shared by the registry, the lookup engine and the
//! ingestion loop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::currency::{Currency, CurrencySelector, Symbol};
use crate::models::price::PriceSample;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::SeaOrmStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint on the symbol was hit
    #[error("duplicate symbol: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Storage operations for currencies and their price history.
///
/// Samples are append-only. Timestamps passed in are expected at
/// microsecond precision (see [`crate::models::price::storage_precision`]).
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Find a currency by symbol regardless of lifecycle state
    async fn find_currency_by_symbol(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<Currency>, StoreError>;

    /// Insert a new active currency
    async fn insert_currency(&self, symbol: &Symbol) -> Result<Currency, StoreError>;

    /// Reactivate a removed currency in place. Returns `None` when the row
    /// does not exist or is already active.
    async fn restore_currency(&self, id: i64) -> Result<Option<Currency>, StoreError>;

    /// Mark the matching active currency removed. Returns `false` when no
    /// active currency matched.
    async fn deactivate_currency(&self, selector: &CurrencySelector) -> Result<bool, StoreError>;

    async fn list_active_currencies(&self) -> Result<Vec<Currency>, StoreError>;

    async fn append_sample(
        &self,
        currency_id: i64,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<PriceSample, StoreError>;

    /// Sample observed exactly at `timestamp`
    async fn sample_at(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError>;

    /// Latest sample with timestamp <= `timestamp`
    async fn sample_before(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError>;

    /// Earliest sample with timestamp >= `timestamp`
    async fn sample_after(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError>;
}
