//! Helpers for string-typed decimal amounts.
//!
//! Callers send amounts as strings with two fractional digits. The wire
//! expects the same, so parsing is lenient and formatting always emits
//! exactly two decimals.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// The canonical zero amount on the wire.
pub const ZERO: &str = "0.00";

/// Parse an amount, treating blank input as zero.
///
/// Returns `None` for non-numeric input.
#[must_use]
pub fn parse(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(raw).ok()
}

/// Parse an amount, mapping invalid input to zero.
#[must_use]
pub fn parse_or_zero(raw: &str) -> Decimal {
    parse(raw).unwrap_or(Decimal::ZERO)
}

/// True when the amount parses to a value strictly greater than zero.
#[must_use]
pub fn is_positive(raw: &str) -> bool {
    parse(raw).is_some_and(|d| d > Decimal::ZERO)
}

/// True when the amount parses to a non-zero value.
#[must_use]
pub fn is_non_zero(raw: &str) -> bool {
    parse(raw).is_some_and(|d| !d.is_zero())
}

/// Format with exactly two fractional digits (half away from zero).
#[must_use]
pub fn format(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Format a quantity with at least two decimals, keeping any finer precision.
#[must_use]
pub fn format_quantity(quantity: Decimal) -> String {
    let mut quantity = quantity.normalize();
    if quantity.scale() < 2 {
        quantity.rescale(2);
    }
    quantity.to_string()
}

/// Normalise an amount string to two decimals; blank and invalid become `0.00`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    format(parse_or_zero(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn blank_parses_as_zero() {
        assert_eq!(parse(""), Some(Decimal::ZERO));
        assert_eq!(parse("  "), Some(Decimal::ZERO));
    }

    #[test]
    fn invalid_is_none() {
        assert_eq!(parse("abc"), None);
        assert_eq!(parse_or_zero("abc"), Decimal::ZERO);
    }

    #[test]
    fn format_always_two_decimals() {
        assert_eq!(format(dec!(5)), "5.00");
        assert_eq!(format(dec!(176471)), "176471.00");
        assert_eq!(format(dec!(1.005)), "1.01");
        assert_eq!(format(dec!(33529.004)), "33529.00");
    }

    #[test]
    fn quantities_are_never_rounded() {
        assert_eq!(format_quantity(dec!(2)), "2.00");
        assert_eq!(format_quantity(dec!(1.5)), "1.50");
        assert_eq!(format_quantity(dec!(0.125)), "0.125");
        assert_eq!(format_quantity(dec!(3.2500)), "3.25");
    }

    #[test]
    fn positivity_checks() {
        assert!(is_positive("10.00"));
        assert!(!is_positive("0.00"));
        assert!(!is_positive("-1"));
        assert!(!is_positive(""));
        assert!(is_non_zero("-1"));
        assert!(!is_non_zero("0"));
    }

    #[test]
    fn normalize_handles_blank_and_zero_forms() {
        assert_eq!(normalize(""), "0.00");
        assert_eq!(normalize("0"), "0.00");
        assert_eq!(normalize("0.00"), "0.00");
        assert_eq!(normalize("12.5"), "12.50");
    }
}
