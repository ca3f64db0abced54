use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use constant_time_eq::constant_time_eq;

use super::{header_value, ADMIN_KEY_HEADER};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.config.admin_api_key.as_deref() else {
        return Err(AppError::Forbidden("Admin endpoints are disabled".into()));
    };

    match header_value(headers, ADMIN_KEY_HEADER) {
        Some(provided) if constant_time_eq(provided.as_bytes(), expected.as_bytes()) => Ok(()),
        Some(_) => Err(AppError::AuthError("Invalid admin key".into())),
        None => Err(AppError::AuthError(format!(
            "The '{ADMIN_KEY_HEADER}' header is required"
        ))),
    }
}

/// Runs the exchange rate refresh outside its schedule.
pub async fn refresh_exchange_rates(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    authorize(&state, &headers)?;
    tracing::info!("Manual exchange rate refresh requested");

    let report = state.refresher.refresh().await?;
    Ok(success(report, "Exchange rates refreshed"))
}
