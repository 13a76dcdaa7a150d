// src/lib.rs

use std::sync::Arc;

use services::{price_lookup::PriceLookupService, registry::CurrencyRegistry};
use store::PriceStore;

#[derive(Clone)]
pub struct AppState {
    pub registry: CurrencyRegistry,
    pub prices: PriceLookupService,
}

impl AppState {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self {
            registry: CurrencyRegistry::new(store.clone()),
            prices: PriceLookupService::new(store),
        }
    }
}

pub mod entities {
    pub mod prelude;
    pub mod currencies;
    pub mod price_samples;
}

pub mod models {
    pub mod currency;
    pub mod error;
    pub mod price;
}

pub mod services {
    pub mod price_feed;
    pub mod price_lookup;
    pub mod registry;
}

pub mod jobs {
    pub mod price_ingestion;
}

pub mod handlers {
    pub mod currency;
    pub mod price;
}

pub mod config;
pub mod error;
pub mod router;
pub mod store;
