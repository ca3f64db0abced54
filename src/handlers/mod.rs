use axum::http::HeaderMap;
use axum::response::Response;
use serde::Serialize;

use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod admin;
pub mod currency;
pub mod discount;
pub mod payment;

pub const SESSION_HEADER: &str = "x-session-id";
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "marketplace-pricing",
    };

    success(payload, "Health check successful")
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub(crate) fn session_id(headers: &HeaderMap) -> Option<&str> {
    header_value(headers, SESSION_HEADER)
}

pub(crate) fn require_session_id(headers: &HeaderMap) -> Result<&str, AppError> {
    session_id(headers).ok_or_else(|| {
        AppError::ValidationError(format!("The '{SESSION_HEADER}' header is required"))
    })
}
