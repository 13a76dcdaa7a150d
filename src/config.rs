//! Process configuration
//!
//! Read once at startup from the environment (a `.env` file is honoured
//! through `dotenvy`). Nothing here is hot-reloaded.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_PG_HOST: &str = "PG_HOST";
pub const ENV_PG_PORT: &str = "PG_PORT";
pub const ENV_PG_USER: &str = "PG_USER";
pub const ENV_PG_PASS: &str = "PG_PASS";
pub const ENV_PG_DBNAME: &str = "PG_DBNAME";
pub const ENV_DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_DB_MIN_CONNECTIONS: &str = "DB_MIN_CONNECTIONS";
pub const ENV_FEED_URL: &str = "PRICE_FEED_URL";
pub const ENV_POLL_INTERVAL: &str = "PRICE_POLL_INTERVAL_SECS";
pub const ENV_QUOTE_CURRENCY: &str = "PRICE_QUOTE_CURRENCY";
pub const ENV_FETCH_TIMEOUT: &str = "PRICE_FETCH_TIMEOUT_SECS";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

const DEFAULT_PG_HOST: &str = "localhost";
const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_PG_USER: &str = "postgres";
const DEFAULT_PG_PASS: &str = "postgres";
const DEFAULT_PG_DBNAME: &str = "price_tracker";
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_MIN_CONNECTIONS: u32 = 5;
const DEFAULT_FEED_URL: &str = "https://api.binance.com";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_QUOTE_CURRENCY: &str = "USDT";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the ticker API, without trailing path
    pub base_url: String,
    pub poll_interval: Duration,
    /// Quote currency appended to every tracked symbol
    pub quote_currency: String,
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub feed: FeedConfig,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig {
            url: database_url(&lookup)?,
            max_connections: parse_or(&lookup, ENV_DB_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_or(&lookup, ENV_DB_MIN_CONNECTIONS, DEFAULT_MIN_CONNECTIONS)?,
        };
        if database.min_connections > database.max_connections {
            return Err(ConfigError::Invalid {
                key: ENV_DB_MIN_CONNECTIONS,
                value: database.min_connections.to_string(),
                reason: format!("exceeds {}", ENV_DB_MAX_CONNECTIONS),
            });
        }

        let feed = FeedConfig {
            base_url: string_or(&lookup, ENV_FEED_URL, DEFAULT_FEED_URL)
                .trim_end_matches('/')
                .to_string(),
            poll_interval: Duration::from_secs(positive_secs(
                &lookup,
                ENV_POLL_INTERVAL,
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            quote_currency: string_or(&lookup, ENV_QUOTE_CURRENCY, DEFAULT_QUOTE_CURRENCY)
                .to_uppercase(),
            fetch_timeout: Duration::from_secs(positive_secs(
                &lookup,
                ENV_FETCH_TIMEOUT,
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
        };

        let bind_addr = parse_or(&lookup, ENV_BIND_ADDR, SocketAddr::from(DEFAULT_BIND_ADDR))?;

        Ok(Self {
            database,
            feed,
            bind_addr,
        })
    }
}

fn string_or<F>(lookup: &F, key: &'static str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn positive_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = parse_or(lookup, key, default)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: secs.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(secs)
}

/// `DATABASE_URL` wins; otherwise the URL is composed from `PG_*` parts
fn database_url<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_DATABASE_URL) {
        return Ok(url);
    }

    let host = string_or(lookup, ENV_PG_HOST, DEFAULT_PG_HOST);
    let port: u16 = parse_or(lookup, ENV_PG_PORT, DEFAULT_PG_PORT)?;
    let user = string_or(lookup, ENV_PG_USER, DEFAULT_PG_USER);
    let pass = lookup(ENV_PG_PASS).unwrap_or_else(|| DEFAULT_PG_PASS.to_string());
    let dbname = string_or(lookup, ENV_PG_DBNAME, DEFAULT_PG_DBNAME);

    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        user, pass, host, port, dbname
    ))
}
