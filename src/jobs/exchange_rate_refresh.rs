use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::services::ExchangeRateRefresher;

/// Refreshes the rate table now and then every `every`.
pub fn start_exchange_rate_refresh_job(
    refresher: ExchangeRateRefresher,
    every: Duration,
) -> JoinHandle<()> {
    // `interval` panics on a zero period.
    let every = every.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick completes immediately, so startup runs a refresh.
            ticker.tick().await;
            tracing::info!("Starting scheduled exchange rate refresh");

            match refresher.refresh().await {
                Ok(report) => tracing::info!(
                    "Exchange rates refreshed from {}: {} currencies updated",
                    report.source.as_str(),
                    report.updated
                ),
                Err(e) => tracing::error!("Failed to refresh exchange rates: {}", e),
            }
        }
    })
}
