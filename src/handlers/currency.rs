use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_session_id, session_id};
use crate::models::Currency;
use crate::services::pricing::{convert_between, format_price};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success, success_with_warning};

pub async fn list_currencies(State(state): State<AppState>) -> Response {
    let listing = state.currencies.list_active_currencies().await;
    let warning = listing.warning.clone();
    success_with_warning(listing.currencies, "Currencies retrieved", warning)
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: Decimal,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertPayload {
    pub amount: Decimal,
    pub from: String,
    pub to: String,
    pub converted: Decimal,
    pub display: String,
}

pub async fn convert_amount(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Response, AppError> {
    let listing = state.currencies.list_active_currencies().await;
    let from = listing.find(&query.from);
    let to = listing.find(&query.to);

    if listing.warning.is_none() {
        for (code, found) in [(&query.from, from), (&query.to, to)] {
            if found.is_none() {
                return Err(AppError::ValidationError(format!(
                    "Currency '{}' is not available",
                    code.trim()
                )));
            }
        }
    }

    let converted = convert_between(query.amount, from, to);
    let payload = ConvertPayload {
        amount: query.amount,
        from: from.map_or_else(|| query.from.trim().to_uppercase(), |c| c.code.clone()),
        to: to.map_or_else(|| query.to.trim().to_uppercase(), |c| c.code.clone()),
        converted,
        display: format_price(converted, to.map(|c| c.symbol.as_str())),
    };

    Ok(success_with_warning(payload, "Amount converted", listing.warning.clone()))
}

#[derive(Debug, Serialize)]
pub struct SelectionPayload {
    pub currency: Option<Currency>,
    pub remembered: bool,
}

pub async fn get_selection(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let remembered = session_id(&headers).and_then(|id| state.sessions.remembered(id));
    let listing = state.currencies.list_active_currencies().await;
    let currency = state
        .currencies
        .select_default(&listing, remembered.as_deref())
        .cloned();

    let payload = SelectionPayload {
        remembered: matches!((&currency, &remembered), (Some(c), Some(code)) if c.code == *code),
        currency,
    };
    success_with_warning(payload, "Currency selection retrieved", listing.warning.clone())
}

#[derive(Debug, Deserialize)]
pub struct SelectCurrency {
    pub code: String,
}

pub async fn put_selection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SelectCurrency>,
) -> Result<Response, AppError> {
    let session = require_session_id(&headers)?;
    let listing = state.currencies.list_active_currencies().await;
    let currency = listing.find(&body.code).cloned().ok_or_else(|| {
        AppError::ValidationError(format!("Currency '{}' is not available", body.code.trim()))
    })?;

    state.sessions.remember(session, &currency.code);
    tracing::debug!(code = %currency.code, "Currency selection remembered");

    Ok(success(currency, "Currency selected"))
}

pub async fn delete_selection(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = require_session_id(&headers)?;
    let message = if state.sessions.end(session) {
        "Currency selection cleared"
    } else {
        "No currency selection to clear"
    };
    Ok(empty_success(message))
}
