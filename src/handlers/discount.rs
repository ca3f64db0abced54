use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{CreateDiscountCode, DiscountVerification, Redemption, VerifyDiscountCode};
use crate::services::DiscountEntry;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success, success_with_warning};

const VERIFY_UNAVAILABLE: &str = "Discount code could not be checked right now";

pub async fn list_codes(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let codes = state.discounts.list_for_event(event_id).await?;
    Ok(success(codes, "Discount codes retrieved"))
}

pub async fn create_code(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<CreateDiscountCode>,
) -> Result<Response, AppError> {
    let code = state.discounts.create(event_id, body).await?;
    Ok(created(code, "Discount code created"))
}

#[derive(Debug, Serialize)]
pub struct VerifyPayload {
    pub status: &'static str,
    #[serde(flatten)]
    pub verification: DiscountVerification,
}

pub async fn verify_code(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<VerifyDiscountCode>,
) -> Result<Response, AppError> {
    let entry = DiscountEntry::Idle
        .check(&body.code)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let (verification, warning) = match state.discounts.verify(&body.code, event_id).await {
        Ok(verification) => (verification, None),
        Err(e) => {
            tracing::warn!(error = %e, %event_id, "Discount verification degraded to invalid");
            (DiscountVerification::invalid(), Some(VERIFY_UNAVAILABLE.to_string()))
        }
    };

    let entry = entry
        .resolve(verification.clone())
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let message = if verification.valid {
        "Discount code applied"
    } else {
        "Discount code is invalid or expired"
    };
    let payload = VerifyPayload {
        status: entry.state_name(),
        verification,
    };
    Ok(success_with_warning(payload, message, warning))
}

pub async fn redeem_code(
    State(state): State<AppState>,
    Path(code_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let redeemed = state.discounts.redeem(code_id).await?;
    let message = if redeemed {
        "Discount code redeemed"
    } else {
        "Discount code is no longer available"
    };
    Ok(success(Redemption { code_id, redeemed }, message))
}
