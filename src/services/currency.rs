//! Active currency lookup, default selection, and per-session currency choice.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::Currency;
use crate::store::CurrencyStore;

pub const CURRENCIES_UNAVAILABLE: &str =
    "Currencies could not be loaded; prices are shown in the base currency";

/// Active currencies plus a warning when the backend read failed.
#[derive(Debug, Clone, Default)]
pub struct CurrencyListing {
    pub currencies: Vec<Currency>,
    pub warning: Option<String>,
}

impl CurrencyListing {
    pub fn find(&self, code: &str) -> Option<&Currency> {
        let code = code.trim();
        self.currencies
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }
}

#[derive(Clone)]
pub struct CurrencyDirectory {
    store: Arc<dyn CurrencyStore>,
    base_currency: String,
}

impl CurrencyDirectory {
    pub fn new(store: Arc<dyn CurrencyStore>, base_currency: impl Into<String>) -> Self {
        Self {
            store,
            base_currency: base_currency.into(),
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Active currencies sorted by code. A backend failure degrades to an
    /// empty listing with a warning.
    pub async fn list_active_currencies(&self) -> CurrencyListing {
        match self.store.list_active().await {
            Ok(mut currencies) => {
                currencies.retain(|c| c.is_active);
                currencies.sort_by(|a, b| a.code.cmp(&b.code));
                for currency in &currencies {
                    if currency.exchange_rate <= Decimal::ZERO {
                        warn!(
                            code = %currency.code,
                            rate = %currency.exchange_rate,
                            "Active currency has a non-positive exchange rate"
                        );
                    }
                }
                debug!(count = currencies.len(), "Loaded active currencies");
                CurrencyListing {
                    currencies,
                    warning: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load currencies");
                CurrencyListing {
                    currencies: Vec::new(),
                    warning: Some(CURRENCIES_UNAVAILABLE.to_string()),
                }
            }
        }
    }

    /// The currency to preselect: the remembered one when still active, then
    /// the base currency, then the first by code.
    pub fn select_default<'a>(
        &self,
        listing: &'a CurrencyListing,
        remembered: Option<&str>,
    ) -> Option<&'a Currency> {
        select_default_currency(&listing.currencies, remembered, &self.base_currency)
    }
}

pub fn select_default_currency<'a>(
    currencies: &'a [Currency],
    remembered: Option<&str>,
    base_currency: &str,
) -> Option<&'a Currency> {
    remembered
        .and_then(|code| currencies.iter().find(|c| c.code == code))
        .or_else(|| currencies.iter().find(|c| c.code == base_currency))
        .or_else(|| currencies.first())
}

/// Currency chosen per client session. Owned by the application state and
/// cleared when the session ends.
#[derive(Default)]
pub struct CurrencySessions {
    selections: RwLock<HashMap<String, String>>,
}

impl CurrencySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remembered(&self, session_id: &str) -> Option<String> {
        self.selections.read().get(session_id).cloned()
    }

    pub fn remember(&self, session_id: &str, code: &str) {
        self.selections
            .write()
            .insert(session_id.to_string(), code.to_string());
    }

    pub fn end(&self, session_id: &str) -> bool {
        self.selections.write().remove(session_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;

    fn currencies() -> Vec<Currency> {
        vec![
            Currency::new("USD", "US Dollar", "$", dec!(0.018)),
            Currency::new("GBP", "Pound Sterling", "£", dec!(0.014)),
            Currency::new("JPY", "Yen", "¥", dec!(2.6)).inactive(),
            Currency::new("ETB", "Ethiopian Birr", "Br", dec!(1)),
            Currency::new("EUR", "Euro", "€", dec!(0.016)),
        ]
    }

    fn directory(store: Arc<MemoryStore>) -> CurrencyDirectory {
        CurrencyDirectory::new(store, "ETB")
    }

    #[tokio::test]
    async fn test_lists_active_sorted_by_code() {
        let store = Arc::new(MemoryStore::new().with_currencies(currencies()));
        let listing = directory(store).list_active_currencies().await;

        let codes: Vec<&str> = listing.currencies.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["ETB", "EUR", "GBP", "USD"]);
        assert!(listing.warning.is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_empty() {
        let store = Arc::new(MemoryStore::new().with_currencies(currencies()));
        store.fail_reads(true);
        let listing = directory(store).list_active_currencies().await;

        assert!(listing.currencies.is_empty());
        assert_eq!(listing.warning.as_deref(), Some(CURRENCIES_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_default_selection_policy() {
        let store = Arc::new(MemoryStore::new().with_currencies(currencies()));
        let directory = directory(store);
        let listing = directory.list_active_currencies().await;

        let chosen = directory.select_default(&listing, Some("GBP")).map(|c| c.code.as_str());
        assert_eq!(chosen, Some("GBP"));

        // Inactive or unknown remembered codes fall back to the base currency.
        let chosen = directory.select_default(&listing, Some("JPY")).map(|c| c.code.as_str());
        assert_eq!(chosen, Some("ETB"));

        let without_base: Vec<Currency> =
            listing.currencies.iter().filter(|c| !c.is_base()).cloned().collect();
        let chosen = select_default_currency(&without_base, None, "ETB").map(|c| c.code.as_str());
        assert_eq!(chosen, Some("EUR"));

        assert!(select_default_currency(&[], Some("USD"), "ETB").is_none());
    }

    #[test]
    fn test_listing_find_ignores_case() {
        let listing = CurrencyListing {
            currencies: currencies(),
            warning: None,
        };
        assert_eq!(listing.find(" usd ").map(|c| c.symbol.as_str()), Some("$"));
        assert!(listing.find("CHF").is_none());
    }

    #[test]
    fn test_sessions_remember_and_end() {
        let sessions = CurrencySessions::new();
        assert!(sessions.remembered("s1").is_none());

        sessions.remember("s1", "EUR");
        sessions.remember("s2", "USD");
        assert_eq!(sessions.remembered("s1").as_deref(), Some("EUR"));

        assert!(sessions.end("s1"));
        assert!(!sessions.end("s1"));
        assert_eq!(sessions.remembered("s2").as_deref(), Some("USD"));
    }
}
