//! Exchange-rate based price conversion and display formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::models::Currency;

const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Converts `amount` from a currency quoted at `from_rate` into one quoted at
/// `to_rate`, i.e. `(amount / from_rate) * to_rate`.
///
/// A non-positive rate yields `amount` unchanged rather than an error, as does
/// arithmetic overflow. No rounding is applied.
pub fn convert(amount: Decimal, from_rate: Decimal, to_rate: Decimal) -> Decimal {
    if from_rate <= Decimal::ZERO || to_rate <= Decimal::ZERO {
        warn!(
            %amount,
            %from_rate,
            %to_rate,
            "Non-positive exchange rate, returning amount unconverted"
        );
        return amount;
    }
    if from_rate == to_rate {
        return amount;
    }

    // Multiplying first keeps results exact whenever the quotient is representable.
    match amount
        .checked_mul(to_rate)
        .and_then(|scaled| scaled.checked_div(from_rate))
    {
        Some(converted) => converted,
        None => {
            warn!(%amount, %from_rate, %to_rate, "Conversion overflowed, returning amount unconverted");
            amount
        }
    }
}

/// Like [`convert`], for rates that may be unknown.
pub fn convert_optional(amount: Decimal, from_rate: Option<Decimal>, to_rate: Option<Decimal>) -> Decimal {
    match (from_rate, to_rate) {
        (Some(from_rate), Some(to_rate)) => convert(amount, from_rate, to_rate),
        _ => {
            warn!(%amount, "Missing exchange rate, returning amount unconverted");
            amount
        }
    }
}

pub fn convert_between(amount: Decimal, from: Option<&Currency>, to: Option<&Currency>) -> Decimal {
    convert_optional(
        amount,
        from.map(|c| c.exchange_rate),
        to.map(|c| c.exchange_rate),
    )
}

/// Rounds to two decimals, midpoint away from zero.
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `"$12.50"` style rendering. Falls back to the bare number without a symbol.
pub fn format_price(amount: Decimal, symbol: Option<&str>) -> String {
    let mut rounded = round_for_display(amount);
    rounded.rescale(DISPLAY_DECIMAL_PLACES);
    match symbol {
        Some(symbol) if !symbol.is_empty() => format!("{symbol}{rounded}"),
        _ => rounded.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_same_rate_is_identity() {
        for rate in [dec!(1), dec!(0.018), dec!(3), dec!(57.1234)] {
            assert_eq!(convert(dec!(100), rate, rate), dec!(100));
            assert_eq!(convert(dec!(33.33), rate, rate), dec!(33.33));
        }
    }

    #[test]
    fn test_zero_rate_returns_amount() {
        assert_eq!(convert(dec!(250), dec!(0), dec!(0.018)), dec!(250));
        assert_eq!(convert(dec!(250), dec!(0.018), dec!(0)), dec!(250));
        assert_eq!(convert(dec!(250), dec!(-1), dec!(2)), dec!(250));
    }

    #[test]
    fn test_missing_rate_returns_amount() {
        assert_eq!(convert_optional(dec!(10), None, Some(dec!(2))), dec!(10));
        assert_eq!(convert_between(dec!(10), None, None), dec!(10));
    }

    #[test]
    fn test_converts_through_base() {
        // 1000 ETB at 0.018 USD/ETB
        assert_eq!(convert(dec!(1000), dec!(1), dec!(0.018)), dec!(18));
        // 18 USD back to ETB
        assert_eq!(convert(dec!(18), dec!(0.018), dec!(1)), dec!(1000));
        // USD -> EUR via base
        assert_eq!(convert(dec!(18), dec!(0.018), dec!(0.016)), dec!(16));
    }

    #[test]
    fn test_convert_between_currencies() {
        let etb = Currency::new("ETB", "Ethiopian Birr", "Br", dec!(1));
        let gbp = Currency::new("GBP", "Pound Sterling", "£", dec!(0.014));
        assert_eq!(convert_between(dec!(500), Some(&etb), Some(&gbp)), dec!(7));
    }

    #[test]
    fn test_overflow_falls_back() {
        assert_eq!(convert(Decimal::MAX, dec!(0.5), dec!(3)), Decimal::MAX);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(12.5), Some("$")), "$12.50");
        assert_eq!(format_price(dec!(0.125), Some("€")), "€0.13");
        assert_eq!(format_price(dec!(7), None), "7.00");
        assert_eq!(format_price(dec!(-2.005), Some("")), "-2.01");
    }
}
