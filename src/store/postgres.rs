//! SeaORM-backed store for Postgres

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, sea_query::Expr,
};
use std::time::Duration;
use tracing::info;

use super::{PriceStore, StoreError};
use crate::config::DatabaseConfig;
use crate::entities::{
    currencies, price_samples,
    prelude::{Currencies, PriceSamples},
};
use crate::models::currency::{Currency, CurrencySelector, CurrencyStatus, Symbol};
use crate::models::price::PriceSample;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a bounded connection pool and verify it with a ping
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .sqlx_logging(false);

        let db = Database::connect(options).await?;
        db.ping().await?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database connection established"
        );

        Ok(Self { db })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Rows are taken as stored; symbols were validated on the way in.
fn to_currency(model: currencies::Model) -> Currency {
    Currency {
        id: model.id,
        symbol: Symbol::from_stored(model.symbol),
        status: CurrencyStatus::from_active(model.active),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn to_sample(model: price_samples::Model) -> PriceSample {
    PriceSample {
        id: model.id,
        currency_id: model.currency_id,
        price: model.price,
        timestamp: model.timestamp.with_timezone(&Utc),
    }
}

#[async_trait]
impl PriceStore for SeaOrmStore {
    async fn find_currency_by_symbol(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<Currency>, StoreError> {
        Ok(Currencies::find()
            .filter(currencies::Column::Symbol.eq(symbol.as_str()))
            .one(&self.db)
            .await?
            .map(to_currency))
    }

    async fn insert_currency(&self, symbol: &Symbol) -> Result<Currency, StoreError> {
        let now = Utc::now().fixed_offset();
        let currency = currencies::ActiveModel {
            symbol: Set(symbol.to_string()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match currency.insert(&self.db).await {
            Ok(model) => Ok(to_currency(model)),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(StoreError::Duplicate(symbol.to_string()))
                }
                _ => Err(e.into()),
            },
        }
    }

    async fn restore_currency(&self, id: i64) -> Result<Option<Currency>, StoreError> {
        // Single conditional UPDATE: of several concurrent restores only one
        // can flip the flag.
        let result = Currencies::update_many()
            .col_expr(currencies::Column::Active, Expr::value(true))
            .col_expr(
                currencies::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(currencies::Column::Id.eq(id))
            .filter(currencies::Column::Active.eq(false))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(Currencies::find_by_id(id)
            .one(&self.db)
            .await?
            .map(to_currency))
    }

    async fn deactivate_currency(&self, selector: &CurrencySelector) -> Result<bool, StoreError> {
        let update = Currencies::update_many()
            .col_expr(currencies::Column::Active, Expr::value(false))
            .col_expr(
                currencies::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(currencies::Column::Active.eq(true));

        let update = match selector {
            CurrencySelector::Id(id) => update.filter(currencies::Column::Id.eq(*id)),
            CurrencySelector::Symbol(symbol) => {
                update.filter(currencies::Column::Symbol.eq(symbol.as_str()))
            }
        };

        let result = update.exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_active_currencies(&self) -> Result<Vec<Currency>, StoreError> {
        Ok(Currencies::find()
            .filter(currencies::Column::Active.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_currency)
            .collect())
    }

    async fn append_sample(
        &self,
        currency_id: i64,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<PriceSample, StoreError> {
        let sample = price_samples::ActiveModel {
            currency_id: Set(currency_id),
            price: Set(price),
            timestamp: Set(timestamp.fixed_offset()),
            ..Default::default()
        };

        Ok(to_sample(sample.insert(&self.db).await?))
    }

    async fn sample_at(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError> {
        Ok(PriceSamples::find()
            .filter(price_samples::Column::CurrencyId.eq(currency_id))
            .filter(price_samples::Column::Timestamp.eq(timestamp.fixed_offset()))
            .one(&self.db)
            .await?
            .map(to_sample))
    }

    async fn sample_before(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError> {
        Ok(PriceSamples::find()
            .filter(price_samples::Column::CurrencyId.eq(currency_id))
            .filter(price_samples::Column::Timestamp.lte(timestamp.fixed_offset()))
            .order_by_desc(price_samples::Column::Timestamp)
            .one(&self.db)
            .await?
            .map(to_sample))
    }

    async fn sample_after(
        &self,
        currency_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, StoreError> {
        Ok(PriceSamples::find()
            .filter(price_samples::Column::CurrencyId.eq(currency_id))
            .filter(price_samples::Column::Timestamp.gte(timestamp.fixed_offset()))
            .order_by_asc(price_samples::Column::Timestamp)
            .one(&self.db)
            .await?
            .map(to_sample))
    }
}
