use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CurrencyStore, DiscountCodeStore, TicketTierStore};
use crate::models::{Currency, DiscountCode, ExchangeRateRefreshLog, TicketTier};
use crate::utils::{AppError, AppResult};

const DISCOUNT_CODE_COLUMNS: &str = "id, event_id, code, discount_percent, discount_amount, \
     valid_from, valid_until, max_uses, current_uses, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CurrencyStore for PgStore {
    async fn list_active(&self) -> AppResult<Vec<Currency>> {
        let currencies = sqlx::query_as::<_, Currency>(
            "SELECT id, code, name, symbol, exchange_rate, is_active, updated_at \
             FROM currencies WHERE is_active = true ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(currencies)
    }

    async fn update_rates(
        &self,
        rates: &BTreeMap<String, Decimal>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut touched = 0;

        for (code, rate) in rates {
            let result = sqlx::query(
                "UPDATE currencies SET exchange_rate = $1, updated_at = $2 WHERE code = $3",
            )
            .bind(rate)
            .bind(updated_at)
            .bind(code)
            .execute(&mut *tx)
            .await?;
            touched += result.rows_affected();
        }

        tx.commit().await?;
        Ok(touched)
    }

    async fn record_refresh(&self, log: &ExchangeRateRefreshLog) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO exchange_rate_refresh_logs (id, source, rates, error, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(log.id)
        .bind(log.source.as_str())
        .bind(Json(&log.rates))
        .bind(log.error.as_deref())
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DiscountCodeStore for PgStore {
    async fn find_active(&self, event_id: Uuid, code: &str) -> AppResult<Option<DiscountCode>> {
        let query = format!(
            "SELECT {DISCOUNT_CODE_COLUMNS} FROM discount_codes \
             WHERE code = $1 AND event_id = $2 AND is_active = true LIMIT 1"
        );
        let found = sqlx::query_as::<_, DiscountCode>(&query)
            .bind(code)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found)
    }

    async fn list_for_event(&self, event_id: Uuid) -> AppResult<Vec<DiscountCode>> {
        let query = format!(
            "SELECT {DISCOUNT_CODE_COLUMNS} FROM discount_codes \
             WHERE event_id = $1 ORDER BY created_at DESC"
        );
        let codes = sqlx::query_as::<_, DiscountCode>(&query)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(codes)
    }

    async fn insert(&self, code: &DiscountCode) -> AppResult<()> {
        let result = sqlx::query(&format!(
            "INSERT INTO discount_codes ({DISCOUNT_CODE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(code.id)
        .bind(code.event_id)
        .bind(&code.code)
        .bind(code.discount_percent)
        .bind(code.discount_amount)
        .bind(code.valid_from)
        .bind(code.valid_until)
        .bind(code.max_uses)
        .bind(code.current_uses)
        .bind(code.is_active)
        .bind(code.created_at)
        .bind(code.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::Conflict(
                format!("Discount code '{}' already exists for this event", code.code),
            )),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
                AppError::NotFound(format!("Event '{}' was not found", code.event_id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn increment_usage(&self, code_id: Uuid) -> AppResult<bool> {
        // The function performs a single conditional UPDATE, so concurrent
        // redemptions cannot push current_uses past max_uses.
        let incremented = sqlx::query_scalar::<_, bool>("SELECT increment_discount_code_usage($1)")
            .bind(code_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(incremented)
    }
}

#[async_trait]
impl TicketTierStore for PgStore {
    async fn find_tier(&self, event_id: Uuid, tier_id: Uuid) -> AppResult<Option<TicketTier>> {
        let tier = sqlx::query_as::<_, TicketTier>(
            "SELECT id, event_id, name, price, total_quantity, available_quantity, \
             created_at, updated_at FROM ticket_tiers WHERE id = $1 AND event_id = $2",
        )
        .bind(tier_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tier)
    }
}
