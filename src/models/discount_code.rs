use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DiscountCode {
    pub id: Uuid,
    pub event_id: Uuid,
    pub code: String,
    pub discount_percent: Option<Decimal>,
    /// Fixed reduction, denominated in the base currency.
    pub discount_amount: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiscountCode {
    /// The descriptor this code grants. Percent wins when both columns are set.
    pub fn kind(&self) -> DiscountKind {
        match (self.discount_percent, self.discount_amount) {
            (Some(percent), _) => DiscountKind::Percent(percent),
            (None, Some(amount)) => DiscountKind::FixedAmount(amount),
            (None, None) => DiscountKind::None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses
            .is_some_and(|max_uses| self.current_uses >= max_uses)
    }

    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        if now < self.valid_from {
            return false;
        }
        match self.valid_until {
            Some(valid_until) => now <= valid_until,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountKind {
    Percent(Decimal),
    FixedAmount(Decimal),
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountVerification {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_id: Option<Uuid>,
    pub discount: DiscountKind,
}

impl DiscountVerification {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            code_id: None,
            discount: DiscountKind::None,
        }
    }

    pub fn valid(code: &DiscountCode) -> Self {
        Self {
            valid: true,
            code_id: Some(code.id),
            discount: code.kind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiscountCode {
    pub code: String,
    pub discount_percent: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyDiscountCode {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Redemption {
    pub code_id: Uuid,
    pub redeemed: bool,
}
