pub mod currency;
pub mod discount;
pub mod exchange_rates;
pub mod payment;
pub mod pricing;

pub use currency::{CurrencyDirectory, CurrencyListing, CurrencySessions};
pub use discount::{DiscountEntry, DiscountResolver};
pub use exchange_rates::{ExchangeRateRefresher, HttpRateProvider, RateProvider, RefreshReport};
pub use payment::{summarize, QuoteService};
pub use pricing::{convert, format_price};
