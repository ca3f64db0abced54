use std::env;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::models::BASE_CURRENCY;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/marketplace";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEFAULT_EXCHANGE_RATE_API_URL: &str = "https://open.er-api.com/v6";
const DEFAULT_EXCHANGE_RATE_TARGETS: &str = "USD,EUR,GBP";
const DEFAULT_REFRESH_SECS: u64 = 14 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub production: bool,
    pub cors_allowed_origins: Vec<String>,
    pub base_currency: String,
    pub exchange_rate_api_url: String,
    pub exchange_rate_api_key: Option<String>,
    pub exchange_rate_targets: Vec<String>,
    pub exchange_rate_refresh_interval: Duration,
    /// Percentage of the discounted subtotal charged as platform fee.
    pub platform_fee_percent: Decimal,
    /// Unset disables the admin endpoints.
    pub admin_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            production: false,
            cors_allowed_origins: split_list(DEFAULT_ALLOWED_ORIGINS),
            base_currency: BASE_CURRENCY.to_string(),
            exchange_rate_api_url: DEFAULT_EXCHANGE_RATE_API_URL.to_string(),
            exchange_rate_api_key: None,
            exchange_rate_targets: split_codes(DEFAULT_EXCHANGE_RATE_TARGETS),
            exchange_rate_refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            platform_fee_percent: Decimal::ZERO,
            admin_api_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            production: env::var("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors_allowed_origins),
            base_currency: env::var("BASE_CURRENCY")
                .map(|v| v.trim().to_uppercase())
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.base_currency),
            exchange_rate_api_url: env::var("EXCHANGE_RATE_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.exchange_rate_api_url),
            exchange_rate_api_key: non_empty_var("EXCHANGE_RATE_API_KEY"),
            exchange_rate_targets: env::var("EXCHANGE_RATE_TARGETS")
                .map(|v| split_codes(&v))
                .unwrap_or(defaults.exchange_rate_targets),
            exchange_rate_refresh_interval: refresh_interval(),
            platform_fee_percent: parse_var("PLATFORM_FEE_PERCENT", defaults.platform_fee_percent),
            admin_api_key: non_empty_var("ADMIN_API_KEY"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Config: invalid {} '{}', using {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn refresh_interval() -> Duration {
    let secs = parse_var("EXCHANGE_RATE_REFRESH_SECS", DEFAULT_REFRESH_SECS);
    if secs == 0 {
        tracing::warn!(
            "Config: EXCHANGE_RATE_REFRESH_SECS must be positive, using {}",
            DEFAULT_REFRESH_SECS
        );
        return Duration::from_secs(DEFAULT_REFRESH_SECS);
    }
    Duration::from_secs(secs)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn split_codes(raw: &str) -> Vec<String> {
    split_list(raw).into_iter().map(|c| c.to_uppercase()).collect()
}
