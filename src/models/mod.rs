pub mod currency;
pub mod discount_code;
pub mod payment;
pub mod ticket;

pub use currency::{Currency, ExchangeRateRefreshLog, RateSource, BASE_CURRENCY};
pub use discount_code::{
    CreateDiscountCode, DiscountCode, DiscountKind, DiscountVerification, Redemption,
    VerifyDiscountCode,
};
pub use payment::{PaymentSummary, Quote, QuoteDisplay, QuoteRequest};
pub use ticket::TicketTier;
