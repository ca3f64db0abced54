use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{admin, currency, discount, health_check, payment};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let cors = create_cors_layer(&state.config.cors_allowed_origins);
    let security = create_security_headers_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .route("/currencies", get(currency::list_currencies))
        .route("/currencies/convert", get(currency::convert_amount))
        .route(
            "/currencies/selection",
            get(currency::get_selection)
                .put(currency::put_selection)
                .delete(currency::delete_selection),
        )
        .route(
            "/events/:event_id/discount-codes",
            get(discount::list_codes).post(discount::create_code),
        )
        .route(
            "/events/:event_id/discount-codes/verify",
            post(discount::verify_code),
        )
        .route("/discount-codes/:code_id/redeem", post(discount::redeem_code))
        .route("/events/:event_id/quote", post(payment::quote))
        .route(
            "/admin/exchange-rates/refresh",
            post(admin::refresh_exchange_rates),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(security)
        .layer(cors)
}
