use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Code of the currency every stored exchange rate is expressed against.
pub const BASE_CURRENCY: &str = "ETB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Currency {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub symbol: String,
    /// Units of this currency per one unit of the base currency.
    pub exchange_rate: Decimal,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl Currency {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        exchange_rate: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into().to_uppercase(),
            name: name.into(),
            symbol: symbol.into(),
            exchange_rate,
            is_active: true,
            updated_at: Utc::now(),
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn is_base(&self) -> bool {
        self.code == BASE_CURRENCY
    }
}

/// Outcome of one exchange rate refresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Api,
    Fallback,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::Api => "api",
            RateSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateRefreshLog {
    pub id: Uuid,
    pub source: RateSource,
    pub rates: BTreeMap<String, Decimal>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}
