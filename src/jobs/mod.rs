pub mod exchange_rate_refresh;

pub use exchange_rate_refresh::start_exchange_rate_refresh_job;
