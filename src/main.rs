use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marketplace_server::config::Config;
use marketplace_server::jobs::start_exchange_rate_refresh_job;
use marketplace_server::routes::create_routes;
use marketplace_server::services::HttpRateProvider;
use marketplace_server::store::PgStore;
use marketplace_server::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let rate_provider = HttpRateProvider::new(
        config.exchange_rate_api_url.clone(),
        config.exchange_rate_api_key.clone(),
    )
    .expect("Failed to build exchange rate client");

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .expect("BIND_ADDR must be a socket address");
    let refresh_every = config.exchange_rate_refresh_interval;

    let state = AppState::new(config, Arc::new(PgStore::new(pool)), Arc::new(rate_provider));
    let _refresh_job = start_exchange_rate_refresh_job(state.refresher.clone(), refresh_every);

    let app = create_routes(state);

    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
