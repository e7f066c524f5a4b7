//! Division helpers that honour the engine's "safe zero" rule: a ratio with
//! an empty or zero denominator is reported as `0`, never NaN, infinity or a
//! `Decimal` division panic.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// `part / total × 100`, or 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

pub fn decimal_ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    numerator
        .checked_div(denominator)
        .and_then(|r| r.to_f64())
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

/// Mean of the values, or zero when there are none.
pub fn decimal_mean(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0u64), |(sum, count), v| (sum + v, count + 1));
    sum.checked_div(Decimal::from(count)).unwrap_or(Decimal::ZERO)
}

pub fn mean(values: &[f64]) -> f64 {
    ratio(values.iter().sum(), values.len() as f64)
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().map(finite_or_zero).unwrap_or(0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_denominators() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(decimal_ratio(dec!(10), dec!(0)), 0.0);
        assert_eq!(decimal_mean(Vec::<Decimal>::new()), dec!(0));
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_regular_values() {
        assert_eq!(percentage(7, 10), 70.0);
        assert_eq!(decimal_ratio(dec!(300), dec!(150)), 2.0);
        assert_eq!(decimal_mean([dec!(10), dec!(-4), dec!(6)]), dec!(4));
    }
}
