mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{decimal, send, test_app, ADMIN_KEY};

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, body) = send(&app.router, "GET", "/health", None, &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_lists_only_active_currencies_sorted() {
    let app = test_app();
    let (status, body) = send(&app.router, "GET", "/currencies", None, &[]).await;

    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["ETB", "EUR", "GBP", "USD"]);
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn test_backend_failure_returns_empty_list_with_warning() {
    let app = test_app();
    app.store.fail_reads(true);

    let (status, body) = send(&app.router, "GET", "/currencies", None, &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert!(body["warning"].as_str().unwrap().contains("base currency"));
}

#[tokio::test]
async fn test_convert_between_codes() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        "GET",
        "/currencies/convert?amount=500&from=etb&to=GBP",
        None,
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["data"]["converted"]), dec!(7));
    assert_eq!(body["data"]["from"], "ETB");
    assert_eq!(body["data"]["display"], "£7.00");
}

#[tokio::test]
async fn test_convert_rejects_unknown_currency() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        "GET",
        "/currencies/convert?amount=10&from=ETB&to=KES",
        None,
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_convert_without_rates_returns_amount() {
    let app = test_app();
    app.store.fail_reads(true);

    let (status, body) = send(
        &app.router,
        "GET",
        "/currencies/convert?amount=10&from=ETB&to=USD",
        None,
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["data"]["converted"]), dec!(10));
    assert!(body["warning"].is_string());
}

#[tokio::test]
async fn test_selection_defaults_to_base_then_remembers() {
    let app = test_app();
    let session = [("x-session-id", "session-a")];

    let (_, body) = send(&app.router, "GET", "/currencies/selection", None, &session).await;
    assert_eq!(body["data"]["currency"]["code"], "ETB");
    assert_eq!(body["data"]["remembered"], false);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/currencies/selection",
        Some(json!({ "code": "eur" })),
        &session,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app.router, "GET", "/currencies/selection", None, &session).await;
    assert_eq!(body["data"]["currency"]["code"], "EUR");
    assert_eq!(body["data"]["remembered"], true);

    // Other sessions are unaffected.
    let (_, body) = send(
        &app.router,
        "GET",
        "/currencies/selection",
        None,
        &[("x-session-id", "session-b")],
    )
    .await;
    assert_eq!(body["data"]["currency"]["code"], "ETB");

    let (status, _) = send(&app.router, "DELETE", "/currencies/selection", None, &session).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app.router, "GET", "/currencies/selection", None, &session).await;
    assert_eq!(body["data"]["currency"]["code"], "ETB");
}

#[tokio::test]
async fn test_selection_rejects_inactive_currency_and_missing_session() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        "PUT",
        "/currencies/selection",
        Some(json!({ "code": "KES" })),
        &[("x-session-id", "s")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/currencies/selection",
        Some(json!({ "code": "USD" })),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_refresh_writes_fallback_rates() {
    let app = test_app();

    let (status, _) = send(&app.router, "POST", "/admin/exchange-rates/refresh", None, &[]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        "POST",
        "/admin/exchange-rates/refresh",
        None,
        &[("x-admin-key", ADMIN_KEY)],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "fallback");
    assert_eq!(app.store.currency("ETB").unwrap().exchange_rate, dec!(1));
    assert_eq!(app.store.refresh_logs().len(), 1);
}

#[tokio::test]
async fn test_admin_refresh_disabled_without_key() {
    let app = common::test_app_with(Default::default());
    let (status, body) = send(
        &app.router,
        "POST",
        "/admin/exchange-rates/refresh",
        None,
        &[("x-admin-key", "anything")],
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = test_app();
    let response = {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;
        app.router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap()
    };

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["cache-control"], "no-store");
    assert!(response.headers().get("strict-transport-security").is_none());
}
