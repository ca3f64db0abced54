#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use marketplace_server::config::Config;
use marketplace_server::models::{Currency, DiscountCode, TicketTier};
use marketplace_server::routes::create_routes;
use marketplace_server::services::RateProvider;
use marketplace_server::store::MemoryStore;
use marketplace_server::utils::{AppError, AppResult};
use marketplace_server::AppState;

pub const ADMIN_KEY: &str = "test-admin-key";

/// Rate provider that always fails, forcing the fallback table.
pub struct OfflineRates;

#[async_trait]
impl RateProvider for OfflineRates {
    fn name(&self) -> &str {
        "offline"
    }

    async fn fetch_rates(&self, _base: &str) -> AppResult<HashMap<String, Decimal>> {
        Err(AppError::ExternalServiceError("offline".into()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub event_id: Uuid,
    pub tier_id: Uuid,
}

pub fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new().with_currencies([
        Currency::new("USD", "US Dollar", "$", dec!(0.018)),
        Currency::new("ETB", "Ethiopian Birr", "Br", dec!(1)),
        Currency::new("GBP", "British Pound", "£", dec!(0.014)),
        Currency::new("EUR", "Euro", "€", dec!(0.016)),
        Currency::new("KES", "Kenyan Shilling", "KSh", dec!(2.3)).inactive(),
    ]))
}

pub fn test_app() -> TestApp {
    test_app_with(Config {
        admin_api_key: Some(ADMIN_KEY.to_string()),
        ..Config::default()
    })
}

pub fn test_app_with(config: Config) -> TestApp {
    let store = seeded_store();
    let event_id = Uuid::new_v4();
    let tier = TicketTier::new(event_id, "General Admission", dec!(1000), 10);
    let tier_id = tier.id;
    store.add_tier(tier);

    let state = AppState::new(config, store.clone(), Arc::new(OfflineRates));

    TestApp {
        router: create_routes(state),
        store,
        event_id,
        tier_id,
    }
}

pub fn discount_code(event_id: Uuid, code: &str) -> DiscountCode {
    let now = Utc::now();
    DiscountCode {
        id: Uuid::new_v4(),
        event_id,
        code: code.to_string(),
        discount_percent: None,
        discount_amount: None,
        valid_from: now - Duration::days(1),
        valid_until: None,
        max_uses: None,
        current_uses: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Reads a decimal serialized as a JSON string.
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .unwrap()
}
