use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{CurrencyStore, DiscountCodeStore, TicketTierStore};
use crate::models::{Currency, DiscountCode, ExchangeRateRefreshLog, TicketTier};
use crate::utils::{AppError, AppResult};

/// Process-local store. Every mutation happens under one lock, which gives
/// `increment_usage` the same check-and-increment atomicity as the SQL function.
#[derive(Default)]
pub struct MemoryStore {
    currencies: Mutex<Vec<Currency>>,
    discount_codes: Mutex<HashMap<Uuid, DiscountCode>>,
    tiers: Mutex<HashMap<Uuid, TicketTier>>,
    refresh_logs: Mutex<Vec<ExchangeRateRefreshLog>>,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_currencies(self, currencies: impl IntoIterator<Item = Currency>) -> Self {
        self.currencies.lock().extend(currencies);
        self
    }

    pub fn add_discount_code(&self, code: DiscountCode) {
        self.discount_codes.lock().insert(code.id, code);
    }

    pub fn add_tier(&self, tier: TicketTier) {
        self.tiers.lock().insert(tier.id, tier);
    }

    pub fn discount_code(&self, id: Uuid) -> Option<DiscountCode> {
        self.discount_codes.lock().get(&id).cloned()
    }

    pub fn currency(&self, code: &str) -> Option<Currency> {
        self.currencies.lock().iter().find(|c| c.code == code).cloned()
    }

    pub fn refresh_logs(&self) -> Vec<ExchangeRateRefreshLog> {
        self.refresh_logs.lock().clone()
    }

    /// Makes every subsequent read fail as if the database were unreachable.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl CurrencyStore for MemoryStore {
    async fn list_active(&self) -> AppResult<Vec<Currency>> {
        self.check_reads()?;
        let mut active: Vec<Currency> = self
            .currencies
            .lock()
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(active)
    }

    async fn update_rates(
        &self,
        rates: &BTreeMap<String, Decimal>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut currencies = self.currencies.lock();
        let mut touched = 0;
        for currency in currencies.iter_mut() {
            if let Some(rate) = rates.get(&currency.code) {
                currency.exchange_rate = *rate;
                currency.updated_at = updated_at;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn record_refresh(&self, log: &ExchangeRateRefreshLog) -> AppResult<()> {
        self.refresh_logs.lock().push(log.clone());
        Ok(())
    }
}

#[async_trait]
impl DiscountCodeStore for MemoryStore {
    async fn find_active(&self, event_id: Uuid, code: &str) -> AppResult<Option<DiscountCode>> {
        self.check_reads()?;
        Ok(self
            .discount_codes
            .lock()
            .values()
            .find(|c| c.event_id == event_id && c.code == code && c.is_active)
            .cloned())
    }

    async fn list_for_event(&self, event_id: Uuid) -> AppResult<Vec<DiscountCode>> {
        self.check_reads()?;
        let mut codes: Vec<DiscountCode> = self
            .discount_codes
            .lock()
            .values()
            .filter(|c| c.event_id == event_id)
            .cloned()
            .collect();
        codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(codes)
    }

    async fn insert(&self, code: &DiscountCode) -> AppResult<()> {
        let mut codes = self.discount_codes.lock();
        if codes
            .values()
            .any(|c| c.event_id == code.event_id && c.code == code.code)
        {
            return Err(AppError::Conflict(format!(
                "Discount code '{}' already exists for this event",
                code.code
            )));
        }
        codes.insert(code.id, code.clone());
        Ok(())
    }

    async fn increment_usage(&self, code_id: Uuid) -> AppResult<bool> {
        let mut codes = self.discount_codes.lock();
        let Some(code) = codes.get_mut(&code_id) else {
            return Ok(false);
        };
        if !code.is_active || code.is_exhausted() {
            return Ok(false);
        }
        code.current_uses += 1;
        code.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl TicketTierStore for MemoryStore {
    async fn find_tier(&self, event_id: Uuid, tier_id: Uuid) -> AppResult<Option<TicketTier>> {
        self.check_reads()?;
        Ok(self
            .tiers
            .lock()
            .get(&tier_id)
            .filter(|t| t.event_id == event_id)
            .cloned())
    }
}
