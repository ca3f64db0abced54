//! Persistence seams for the pricing pipeline.
//!
//! Services only talk to these traits. [`PgStore`] backs them with Postgres;
//! [`MemoryStore`] keeps everything in process and is what the test suites use.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Currency, DiscountCode, ExchangeRateRefreshLog, TicketTier};
use crate::utils::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CurrencyStore: Send + Sync {
    /// Active currencies ordered by code.
    async fn list_active(&self) -> AppResult<Vec<Currency>>;

    /// Overwrites `exchange_rate` for each listed code. Returns rows touched.
    async fn update_rates(
        &self,
        rates: &BTreeMap<String, Decimal>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<u64>;

    async fn record_refresh(&self, log: &ExchangeRateRefreshLog) -> AppResult<()>;
}

#[async_trait]
pub trait DiscountCodeStore: Send + Sync {
    /// The active code `code` of `event_id`, if any.
    async fn find_active(&self, event_id: Uuid, code: &str) -> AppResult<Option<DiscountCode>>;

    async fn list_for_event(&self, event_id: Uuid) -> AppResult<Vec<DiscountCode>>;

    /// Fails with `AppError::Conflict` when the event already has this code.
    async fn insert(&self, code: &DiscountCode) -> AppResult<()>;

    /// Atomically bumps `current_uses` unless the code is inactive, unknown or
    /// already at `max_uses`. Returns whether the increment happened.
    async fn increment_usage(&self, code_id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait TicketTierStore: Send + Sync {
    async fn find_tier(&self, event_id: Uuid, tier_id: Uuid) -> AppResult<Option<TicketTier>>;
}
