//! Conversion of major-unit prices into provider minor units

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::DomainError;

/// Convert a major-unit amount (e.g. rupees) into minor units (e.g. paise).
///
/// Rounds half-up at the minor-unit boundary, so `10.005` with exponent 2
/// becomes `1001`. Negative amounts are rejected.
pub fn to_minor_units(amount: Decimal, exponent: u32) -> Result<i64, DomainError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::ValidationError(format!(
            "amount must not be negative: {amount}"
        )));
    }

    let scale = 10_i64
        .checked_pow(exponent)
        .map(Decimal::from)
        .ok_or_else(|| {
            DomainError::ValidationError(format!("currency exponent too large: {exponent}"))
        })?;
    amount
        .checked_mul(scale)
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or_else(|| DomainError::ValidationError(format!("amount out of range: {amount}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_whole_amounts() {
        assert_eq!(to_minor_units(dec("200"), 2).unwrap(), 20_000);
        assert_eq!(to_minor_units(Decimal::ZERO, 2).unwrap(), 0);
    }

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(to_minor_units(dec("10.005"), 2).unwrap(), 1001);
        assert_eq!(to_minor_units(dec("10.004"), 2).unwrap(), 1000);
        assert_eq!(to_minor_units(dec("99.995"), 2).unwrap(), 10_000);
    }

    #[test]
    fn test_zero_exponent() {
        assert_eq!(to_minor_units(dec("1500.5"), 0).unwrap(), 1501);
    }

    #[test]
    fn test_negative_rejected() {
        assert!(to_minor_units(dec("-1"), 2).is_err());
    }

    #[test]
    fn test_oversized_exponent_is_rejected() {
        assert_eq!(to_minor_units(dec("1"), 18).unwrap(), 1_000_000_000_000_000_000);
        let err = to_minor_units(dec("1"), 19).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert!(to_minor_units(Decimal::ZERO, u32::MAX).is_err());
    }
}
