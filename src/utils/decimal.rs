//! Decimal arithmetic utilities for financial calculations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Convert a ratio to a percentage (0.75 -> 75).
pub fn to_percent(ratio: Decimal) -> Decimal {
    ratio * dec!(100)
}

/// Floor a value at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Treat amounts strictly below `threshold` as zero.
pub fn zero_below(value: Decimal, threshold: Decimal) -> Decimal {
    if value < threshold {
        Decimal::ZERO
    } else {
        value
    }
}

/// Safe division that returns zero if divisor is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}
