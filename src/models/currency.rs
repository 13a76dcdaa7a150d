//! Tracked currency domain types and request/response models
//!
//! Models for POST /api/v1/currency/add and POST /api/v1/currency/remove.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TrackerError;

/// Maximum ticker length accepted by the registry
pub const MAX_SYMBOL_LEN: usize = 10;

/// Validated uppercase ticker such as `BTC`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Trims surrounding whitespace, then requires 1..=10 ASCII
    /// alphanumerics with no lowercase letters.
    pub fn parse(raw: &str) -> Result<Self, TrackerError> {
        let symbol = raw.trim();

        if symbol.is_empty() {
            return Err(TrackerError::InvalidArgument(
                "symbol is required".to_string(),
            ));
        }
        if symbol.chars().count() > MAX_SYMBOL_LEN {
            return Err(TrackerError::InvalidArgument(format!(
                "symbol must be at most {} characters",
                MAX_SYMBOL_LEN
            )));
        }
        if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TrackerError::InvalidArgument(
                "symbol must contain only letters and digits".to_string(),
            ));
        }
        if symbol.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(TrackerError::InvalidArgument(
                "symbol must be uppercase".to_string(),
            ));
        }

        Ok(Self(symbol.to_string()))
    }

    /// Wrap a symbol read back from storage without re-validating it
    pub(crate) fn from_stored(symbol: String) -> Self {
        Self(symbol)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trading pair understood by the price feed, e.g. `BTC` + `USDT`
    pub fn trading_pair(&self, quote_currency: &str) -> String {
        format!("{}{}", self.0, quote_currency.to_uppercase())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a tracked currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyStatus {
    Active,
    Removed,
}

impl CurrencyStatus {
    pub fn from_active(active: bool) -> Self {
        if active {
            CurrencyStatus::Active
        } else {
            CurrencyStatus::Removed
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, CurrencyStatus::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub id: i64,
    pub symbol: Symbol,
    pub status: CurrencyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Selects the currency targeted by a removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencySelector {
    Id(i64),
    Symbol(Symbol),
}

impl fmt::Display for CurrencySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencySelector::Id(id) => write!(f, "id={}", id),
            CurrencySelector::Symbol(symbol) => write!(f, "symbol={}", symbol),
        }
    }
}

/// Result of registering a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was inserted
    Created(Currency),
    /// A removed row was reactivated in place
    Restored(Currency),
}

impl AddOutcome {
    pub fn currency(&self) -> &Currency {
        match self {
            AddOutcome::Created(c) | AddOutcome::Restored(c) => c,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddCurrencyRequest {
    pub symbol: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoveCurrencyRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl RemoveCurrencyRequest {
    /// `id` wins when both selectors are present, but a supplied symbol
    /// must still be well formed.
    pub fn selector(&self) -> Result<CurrencySelector, TrackerError> {
        let symbol = self.symbol.as_deref().map(Symbol::parse).transpose()?;

        match (self.id, symbol) {
            (Some(id), _) => Ok(CurrencySelector::Id(id)),
            (None, Some(symbol)) => Ok(CurrencySelector::Symbol(symbol)),
            (None, None) => Err(TrackerError::InvalidArgument(
                "Must provide either id or symbol".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrencyResponse {
    pub id: i64,
    pub symbol: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Currency> for CurrencyResponse {
    fn from(currency: &Currency) -> Self {
        Self {
            id: currency.id,
            symbol: currency.symbol.to_string(),
            active: currency.status.is_active(),
            created_at: currency.created_at,
            updated_at: currency.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
