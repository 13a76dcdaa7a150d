//! In-memory store backed by ordered maps

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::{PriceStore, StoreError};
use crate::models::currency::{Currency, CurrencySelector, CurrencyStatus, Symbol};
use crate::models::price::PriceSample;

/// History key: (timestamp, sample id) keeps equal timestamps distinct
type HistoryKey = (DateTime<Utc>, i64);

#[derive(Default)]
struct Inner {
    currencies: BTreeMap<i64, Currency>,
    by_symbol: HashMap<Symbol, i64>,
    history: HashMap<i64, BTreeMap<HistoryKey, PriceSample>>,
    next_currency_id: i64,
    next_sample_id: i64,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples stored for a currency
    pub fn sample_count(&self, currency_id: i64) -> usize {
        self.inner
            .read()
            .history
            .get(&currency_id)
            .map_or(0, BTreeMap::len)
    }
}

impl Inner {
    fn history(&self, currency_id: i64) -> Option<&BTreeMap<HistoryKey, PriceSample>> {
        self.history.get(&currency_id)
    }
}

#[async_trait]
impl PriceStore for InMemoryStore {
    async fn find_currency_by_symbol(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<Currency>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .by_symbol
            .get(symbol)
            .and_then(|id| inner.currencies.get(id))
            .cloned())
    }

    async fn insert_currency(&self, symbol: &Symbol) -> Result<Currency, StoreError> {
        let mut inner = self.inner.write();
        if inner.by_symbol.contains_key(symbol) {
            return Err(StoreError::Duplicate(symbol.to_string()));
        }

        inner.next_currency_id += 1;
        let now = Utc::now();
        let currency = Currency {
            id: inner.next_currency_id,
            symbol: symbol.clone(),
            status: CurrencyStatus::Active,
            created_at: now,
            updated_at: now,
        };
        inner.by_symbol.insert(symbol.clone(), currency.id);
        inner.currencies.insert(currency.id, currency.clone());
        Ok(currency)
    }

    async fn restore_currency(&self, id: i64) -> Result<Option<Currency>, StoreError> {
        let mut inner = self.inner.write();
        match inner.currencies.get_mut(&id) {
            Some(currency) if !currency.status.is_active() => {
                currency.status = CurrencyStatus::Active;
                currency.updated_at = Utc::now();
                Ok(Some(currency.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn deactivate_currency(&self, selector: &CurrencySelector) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let id = match selector {
            CurrencySelector::Id(id) => Some(*id),
            CurrencySelector::Symbol(symbol) => inner.by_symbol.get(symbol).copied(),
        };

        match id.and_then(|id| inner.currencies.get_mut(&id)) {
            Some(currency) if currency.status.is_active() => {
                currency.status = CurrencyStatus::Removed;
                currency.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_active_currencies(&self) -> Result<Vec<Currency>, StoreError> {
        Ok(self
            .inner
            .read()
            .currencies
            .values()
            .filter(|c| c.status.is_active())
            .cloned()
            .collect())
    }

    async fn append_sample(
        &self,
        currency_id: i64,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<PriceSample, StoreError> {
        let mut inner = self.inner.write();
        if !inner.currencies.contains_key(&currency_id) {
            return Err(StoreError::Database(sea_orm::DbErr::RecordNotFound(format!(
                "currency {} does not exist",
                currency_id
            ))));
        }

        inner.next_sample_id += 1;
        let sample = PriceSample {
            id: inner.next_sample_id,
            currency_id,
            price,
            timestamp,
        };
        inner
            .history
            .entry(currency_id)
            .or_default()
            .insert((timestamp, sample.id), sample.clone());
        Ok(sample)
    }

    async fn sample_at(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError> {
        let inner = self.inner.read();
        Ok(inner.history(currency_id).and_then(|h| {
            h.range((timestamp, i64::MIN)..=(timestamp, i64::MAX))
                .next()
                .map(|(_, s)| s.clone())
        }))
    }

    async fn sample_before(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError> {
        let inner = self.inner.read();
        Ok(inner.history(currency_id).and_then(|h| {
            h.range(..=(timestamp, i64::MAX))
                .next_back()
                .map(|(_, s)| s.clone())
        }))
    }

    async fn sample_after(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError> {
        let inner = self.inner.read();
        Ok(inner.history(currency_id).and_then(|h| {
            h.range((timestamp, i64::MIN)..)
                .next()
                .map(|(_, s)| s.clone())
        }))
    }
}
