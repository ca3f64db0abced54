//! Third-party exchange rate fetching and the rate table refresh.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{ExchangeRateRefreshLog, RateSource, BASE_CURRENCY};
use crate::store::CurrencyStore;
use crate::utils::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Rates written when the provider cannot be reached, relative to ETB.
pub fn fallback_rates() -> BTreeMap<String, Decimal> {
    BTreeMap::from([
        (BASE_CURRENCY.to_string(), Decimal::ONE),
        ("USD".to_string(), Decimal::new(18, 3)),
        ("EUR".to_string(), Decimal::new(16, 3)),
        ("GBP".to_string(), Decimal::new(14, 3)),
    ])
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Units of each currency per one unit of `base`, keyed by code.
    async fn fetch_rates(&self, base: &str) -> AppResult<HashMap<String, Decimal>>;
}

/// Client for `GET {base_url}/latest/{base}` style rate APIs.
#[derive(Clone)]
pub struct HttpRateProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    #[serde(default)]
    rates: HashMap<String, serde_json::Number>,
}

impl HttpRateProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalServerError(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_rates(&self, base: &str) -> AppResult<HashMap<String, Decimal>> {
        let url = format!("{}/latest/{}", self.base_url, base);
        info!("Fetching exchange rates from {}", url);

        let mut request = self.client.get(&url).header("accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Rate API unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "Rate API error {status}: {body}"
            )));
        }

        let data: LatestRatesResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Rate API payload: {e}")))?;

        if matches!(data.result.as_deref(), Some(result) if result != "success") {
            return Err(AppError::ExternalServiceError(format!(
                "Rate API reported '{}'",
                data.result.unwrap_or_default()
            )));
        }

        Ok(data
            .rates
            .into_iter()
            .filter_map(|(code, number)| parse_rate(&number).map(|rate| (code.to_uppercase(), rate)))
            .collect())
    }
}

fn parse_rate(number: &serde_json::Number) -> Option<Decimal> {
    let raw = number.to_string();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub source: RateSource,
    pub rates: BTreeMap<String, Decimal>,
    pub updated: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Overwrites the stored rate table from a [`RateProvider`], substituting
/// [`fallback_rates`] whenever the provider fails.
#[derive(Clone)]
pub struct ExchangeRateRefresher {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn CurrencyStore>,
    base_currency: String,
    targets: Vec<String>,
}

impl ExchangeRateRefresher {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<dyn CurrencyStore>,
        base_currency: impl Into<String>,
        targets: Vec<String>,
    ) -> Self {
        Self {
            provider,
            store,
            base_currency: base_currency.into(),
            targets,
        }
    }

    pub async fn refresh(&self) -> AppResult<RefreshReport> {
        let (source, rates, failure) = match self.fetch_targets().await {
            Ok(rates) => (RateSource::Api, rates, None),
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Exchange rate fetch failed, writing fallback rates"
                );
                let mut rates = fallback_rates();
                if self.base_currency != BASE_CURRENCY {
                    warn!(base = %self.base_currency, "Fallback rates are quoted against ETB");
                }
                rates.insert(self.base_currency.clone(), Decimal::ONE);
                (RateSource::Fallback, rates, Some(e.to_string()))
            }
        };

        let now = Utc::now();
        let updated = self.store.update_rates(&rates, now).await.map_err(|e| {
            error!(error = %e, "Failed to write exchange rates");
            e
        })?;

        let log = ExchangeRateRefreshLog {
            id: Uuid::new_v4(),
            source,
            rates: rates.clone(),
            error: failure.clone(),
            created_at: now,
        };
        if let Err(e) = self.store.record_refresh(&log).await {
            warn!(error = %e, "Failed to record exchange rate refresh");
        }

        info!(
            source = source.as_str(),
            updated,
            "Exchange rate refresh complete"
        );

        Ok(RefreshReport {
            source,
            rates,
            updated,
            error: failure,
        })
    }

    async fn fetch_targets(&self) -> AppResult<BTreeMap<String, Decimal>> {
        let fetched = self.provider.fetch_rates(&self.base_currency).await?;

        let mut rates = BTreeMap::new();
        rates.insert(self.base_currency.clone(), Decimal::ONE);
        for code in &self.targets {
            if *code == self.base_currency {
                continue;
            }
            match fetched.get(code) {
                Some(rate) if *rate > Decimal::ZERO => {
                    rates.insert(code.clone(), *rate);
                }
                Some(rate) => {
                    return Err(AppError::ExternalServiceError(format!(
                        "Rate API returned non-positive rate {rate} for {code}"
                    )))
                }
                None => {
                    return Err(AppError::ExternalServiceError(format!(
                        "Rate API returned no rate for {code}"
                    )))
                }
            }
        }
        Ok(rates)
    }
}
