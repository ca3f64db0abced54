//! Discount code verification, redemption and creation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{CreateDiscountCode, DiscountCode, DiscountVerification};
use crate::store::DiscountCodeStore;
use crate::utils::{AppError, AppResult};

const MAX_CODE_LEN: usize = 64;

/// Codes are matched exactly after trimming and upper-casing.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Clone)]
pub struct DiscountResolver {
    store: Arc<dyn DiscountCodeStore>,
}

impl DiscountResolver {
    pub fn new(store: Arc<dyn DiscountCodeStore>) -> Self {
        Self { store }
    }

    pub async fn verify(&self, code: &str, event_id: Uuid) -> AppResult<DiscountVerification> {
        self.verify_at(code, event_id, Utc::now()).await
    }

    /// Checks `code` against `event_id` as of `now`. Unknown, expired,
    /// not-yet-valid and exhausted codes all come back invalid; only backend
    /// failures are errors.
    pub async fn verify_at(
        &self,
        code: &str,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<DiscountVerification> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Ok(DiscountVerification::invalid());
        }

        let Some(found) = self.store.find_active(event_id, &code).await? else {
            debug!(%event_id, code = %code, "Discount code not found");
            return Ok(DiscountVerification::invalid());
        };

        if !found.is_within_window(now) {
            debug!(code_id = %found.id, "Discount code outside its validity window");
            return Ok(DiscountVerification::invalid());
        }

        if found.is_exhausted() {
            debug!(code_id = %found.id, uses = found.current_uses, "Discount code exhausted");
            return Ok(DiscountVerification::invalid());
        }

        Ok(DiscountVerification::valid(&found))
    }

    /// Records one use of the code. `false` means the cap was reached (possibly
    /// by a concurrent redemption since verification) or the code is gone.
    pub async fn redeem(&self, code_id: Uuid) -> AppResult<bool> {
        let redeemed = self.store.increment_usage(code_id).await?;
        if redeemed {
            info!(%code_id, "Discount code redeemed");
        } else {
            warn!(%code_id, "Discount code redemption rejected");
        }
        Ok(redeemed)
    }

    pub async fn list_for_event(&self, event_id: Uuid) -> AppResult<Vec<DiscountCode>> {
        self.store.list_for_event(event_id).await
    }

    pub async fn create(&self, event_id: Uuid, request: CreateDiscountCode) -> AppResult<DiscountCode> {
        let code = build_discount_code(event_id, request, Utc::now())?;
        self.store.insert(&code).await?;
        info!(%event_id, code_id = %code.id, code = %code.code, "Discount code created");
        Ok(code)
    }
}

fn build_discount_code(
    event_id: Uuid,
    request: CreateDiscountCode,
    now: DateTime<Utc>,
) -> AppResult<DiscountCode> {
    let code = normalize_code(&request.code);
    if code.is_empty() {
        return Err(AppError::ValidationError("Discount code must not be empty".into()));
    }
    if code.len() > MAX_CODE_LEN || code.chars().any(char::is_whitespace) {
        return Err(AppError::ValidationError(format!(
            "Discount code must be at most {MAX_CODE_LEN} characters without spaces"
        )));
    }

    match (request.discount_percent, request.discount_amount) {
        (None, None) => {
            return Err(AppError::ValidationError(
                "Either discount_percent or discount_amount is required".into(),
            ))
        }
        (Some(percent), _) if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED => {
            return Err(AppError::ValidationError(
                "discount_percent must be greater than 0 and at most 100".into(),
            ))
        }
        (_, Some(amount)) if amount <= Decimal::ZERO => {
            return Err(AppError::ValidationError(
                "discount_amount must be positive".into(),
            ))
        }
        _ => {}
    }

    let valid_from = request.valid_from.unwrap_or(now);
    if let Some(valid_until) = request.valid_until {
        if valid_until <= valid_from {
            return Err(AppError::ValidationError(
                "valid_until must be after valid_from".into(),
            ));
        }
    }

    if matches!(request.max_uses, Some(max_uses) if max_uses <= 0) {
        return Err(AppError::ValidationError("max_uses must be positive".into()));
    }

    Ok(DiscountCode {
        id: Uuid::new_v4(),
        event_id,
        code,
        discount_percent: request.discount_percent,
        discount_amount: request.discount_amount,
        valid_from,
        valid_until: request.valid_until,
        max_uses: request.max_uses,
        current_uses: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

/// Progress of a customer entering a discount code.
///
/// `Idle -> Checking -> {Valid | Invalid}`; `Valid -> Idle` on clear and
/// `Invalid -> Checking` on retry. An invalid entry can only become valid by
/// being checked again.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiscountEntry {
    #[default]
    Idle,
    Checking { code: String },
    Valid { code: String, verification: DiscountVerification },
    Invalid { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} a discount entry that is {state}")]
pub struct InvalidTransition {
    pub action: &'static str,
    pub state: &'static str,
}

impl DiscountEntry {
    pub fn state_name(&self) -> &'static str {
        match self {
            DiscountEntry::Idle => "idle",
            DiscountEntry::Checking { .. } => "checking",
            DiscountEntry::Valid { .. } => "valid",
            DiscountEntry::Invalid { .. } => "invalid",
        }
    }

    pub fn check(self, code: &str) -> Result<Self, InvalidTransition> {
        match self {
            DiscountEntry::Idle | DiscountEntry::Invalid { .. } => Ok(DiscountEntry::Checking {
                code: normalize_code(code),
            }),
            other => Err(InvalidTransition {
                action: "check",
                state: other.state_name(),
            }),
        }
    }

    pub fn resolve(self, verification: DiscountVerification) -> Result<Self, InvalidTransition> {
        match self {
            DiscountEntry::Checking { code } if verification.valid => {
                Ok(DiscountEntry::Valid { code, verification })
            }
            DiscountEntry::Checking { code } => Ok(DiscountEntry::Invalid { code }),
            other => Err(InvalidTransition {
                action: "resolve",
                state: other.state_name(),
            }),
        }
    }

    pub fn clear(self) -> Result<Self, InvalidTransition> {
        match self {
            DiscountEntry::Valid { .. } | DiscountEntry::Idle => Ok(DiscountEntry::Idle),
            other => Err(InvalidTransition {
                action: "clear",
                state: other.state_name(),
            }),
        }
    }
}
