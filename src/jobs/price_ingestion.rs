//! Price Ingestion Job
//!
//! Periodically fetches the latest price of every active currency from the
//! price feed and appends a timestamped sample to the store. One currency's
//! failure never affects the others; nothing is retried before the next
//! tick. Stopped through [`IngestionHandle::stop`].

use chrono::Utc;
use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::FeedConfig;
use crate::error::TrackerError;
use crate::models::currency::Currency;
use crate::models::price::{PRICE_SCALE, PriceSample, storage_precision};
use crate::services::price_feed::{FeedError, PriceFeed};
use crate::services::registry::CurrencyRegistry;
use crate::store::PriceStore;

/// Outcome of one polling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tracked: usize,
    pub stored: usize,
    pub failed: usize,
}

pub struct PriceIngestionJob {
    registry: CurrencyRegistry,
    store: Arc<dyn PriceStore>,
    feed: Arc<dyn PriceFeed>,
    quote_currency: String,
    poll_interval: Duration,
    fetch_timeout: Duration,
}

impl PriceIngestionJob {
    pub fn new(store: Arc<dyn PriceStore>, feed: Arc<dyn PriceFeed>, config: &FeedConfig) -> Self {
        Self {
            registry: CurrencyRegistry::new(store.clone()),
            store,
            feed,
            quote_currency: config.quote_currency.clone(),
            poll_interval: config.poll_interval,
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Run one polling pass over all active currencies.
    ///
    /// Fetches run concurrently; every failure is logged and counted.
    pub async fn run_tick(&self) -> TickReport {
        let currencies = match self.registry.list_active().await {
            Ok(currencies) => currencies,
            Err(e) => {
                error!(error = %e, "Failed to list tracked currencies");
                return TickReport::default();
            }
        };

        if currencies.is_empty() {
            info!("No tracked currencies, skipping tick");
            return TickReport::default();
        }

        let results = join_all(currencies.iter().map(|c| self.ingest_one(c))).await;

        let mut report = TickReport {
            tracked: currencies.len(),
            ..Default::default()
        };
        for (currency, result) in currencies.iter().zip(results) {
            match result {
                Ok(sample) => {
                    report.stored += 1;
                    debug!(symbol = %currency.symbol, price = %sample.price, "Price sample stored");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(symbol = %currency.symbol, error = %e, "Failed to ingest price, skipping");
                }
            }
        }

        info!(
            tracked = report.tracked,
            stored = report.stored,
            failed = report.failed,
            "Price ingestion tick completed"
        );
        report
    }

    async fn ingest_one(&self, currency: &Currency) -> Result<PriceSample, TrackerError> {
        let pair = currency.symbol.trading_pair(&self.quote_currency);
        let price = self.fetch_with_timeout(&pair).await?;

        let sample = self
            .store
            .append_sample(
                currency.id,
                price.round_dp(PRICE_SCALE),
                storage_precision(Utc::now()),
            )
            .await?;
        Ok(sample)
    }

    async fn fetch_with_timeout(&self, pair: &str) -> Result<Decimal, FeedError> {
        timeout(self.fetch_timeout, self.feed.fetch_price(pair))
            .await
            .map_err(|_| FeedError::Timeout(self.fetch_timeout))?
    }

    /// Start polling in the background. The first tick fires immediately.
    pub fn spawn(self) -> IngestionHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(self.run(token.clone()));
        IngestionHandle { token, task }
    }

    async fn run(self, token: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            quote = %self.quote_currency,
            "Price ingestion job started"
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            warn!("Stop requested mid-tick, abandoning remaining fetches");
                            break;
                        }
                        _ = self.run_tick() => {}
                    }
                }
            }
        }

        info!("Price ingestion job stopped");
    }
}

/// Handle to a running ingestion job
pub struct IngestionHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl IngestionHandle {
    /// Signal the job to stop and wait for it to exit.
    ///
    /// Takes the handle by value, so a job can only be stopped once.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "Price ingestion task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
