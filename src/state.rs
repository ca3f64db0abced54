use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    CurrencyDirectory, CurrencySessions, DiscountResolver, ExchangeRateRefresher, QuoteService,
    RateProvider,
};
use crate::store::{CurrencyStore, DiscountCodeStore, TicketTierStore};

/// Everything request handlers need, injected once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub currencies: CurrencyDirectory,
    pub discounts: DiscountResolver,
    pub quotes: QuoteService,
    pub sessions: Arc<CurrencySessions>,
    pub refresher: ExchangeRateRefresher,
}

impl AppState {
    /// Wires every service to one store implementing all persistence traits.
    pub fn new<S>(config: Config, store: Arc<S>, rate_provider: Arc<dyn RateProvider>) -> Self
    where
        S: CurrencyStore + DiscountCodeStore + TicketTierStore + 'static,
    {
        let currencies = CurrencyDirectory::new(store.clone(), config.base_currency.clone());
        let discounts = DiscountResolver::new(store.clone());
        let quotes = QuoteService::new(
            store.clone(),
            currencies.clone(),
            discounts.clone(),
            config.platform_fee_percent,
        );
        let refresher = ExchangeRateRefresher::new(
            rate_provider,
            store,
            config.base_currency.clone(),
            config.exchange_rate_targets.clone(),
        );

        Self {
            config: Arc::new(config),
            currencies,
            discounts,
            quotes,
            sessions: Arc::new(CurrencySessions::new()),
            refresher,
        }
    }
}
