//! FP32 fixed-point arithmetic.
//!
//! Ratios are unsigned integers scaled by [`FP32`] (2^32): a multiplier equal
//! to `FP32` is exactly 1.0. Amounts are plain `u128` token units.
//!
//! All helpers are overflow-checked. Intermediate products are formed in
//! 128 bits and divided last, so `mul_div` rounds toward zero exactly once.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::types::HOURS_PER_YEAR;

/// Fixed-point scale: 1.0 == 2^32.
pub const FP32: u128 = 1 << 32;

/// Computes `a * b / denominator`, rounding toward zero.
///
/// # Errors
///
/// Returns `CoreError::Overflow` if `a * b` does not fit in 128 bits and
/// `CoreError::DivisionByZero` if `denominator` is zero.
#[inline]
pub fn mul_div(a: u128, b: u128, denominator: u128) -> CoreResult<u128> {
    if denominator == 0 {
        return Err(CoreError::DivisionByZero {
            operation: "mul_div",
        });
    }
    a.checked_mul(b)
        .map(|product| product / denominator)
        .ok_or(CoreError::overflow("mul_div"))
}

/// Checked addition tagged with the calling operation.
#[inline]
pub fn add(a: u128, b: u128, operation: &'static str) -> CoreResult<u128> {
    a.checked_add(b).ok_or(CoreError::overflow(operation))
}

/// Checked subtraction tagged with the calling operation.
#[inline]
pub fn sub(a: u128, b: u128, operation: &'static str) -> CoreResult<u128> {
    a.checked_sub(b)
        .ok_or_else(|| CoreError::underflow(operation, a, b))
}

/// Grows `balance` by the ratio of two accumulator readings.
///
/// `yield_quotient_fp` is the accumulator value recorded when the balance was
/// last settled; `accumulator_fp` is the current value.
///
/// # Example
///
/// ```rust
/// use lendcurve_core::fixed_point::{apply_interest, FP32};
///
/// // Accumulator grew from 1.0 to 1.1 since the balance was recorded.
/// let balance = apply_interest(1_000, FP32 + FP32 / 10, FP32).unwrap();
/// assert_eq!(balance, 1_100);
/// ```
#[inline]
pub fn apply_interest(
    balance: u128,
    accumulator_fp: u128,
    yield_quotient_fp: u128,
) -> CoreResult<u128> {
    mul_div(balance, accumulator_fp, yield_quotient_fp)
}

/// Converts an annual percentage rate into FP32 interest per hour.
///
/// `110` (percent) becomes `FP32 * 1.10 / 8760`, truncated. The result is the
/// interest part only; add [`FP32`] for a multiplier.
///
/// # Errors
///
/// Returns `CoreError::InvalidRate` for negative or unrepresentable rates.
pub fn hourly_interest_fp_from_apr(apr_percent: Decimal) -> CoreResult<u128> {
    if apr_percent.is_sign_negative() {
        return Err(CoreError::invalid_rate(format!(
            "APR must not be negative, got {apr_percent}%"
        )));
    }
    let scale = Decimal::from(FP32 as u64);
    let hourly = apr_percent
        .checked_mul(scale)
        .ok_or_else(|| CoreError::invalid_rate(format!("APR {apr_percent}% is too large")))?
        / Decimal::ONE_HUNDRED
        / Decimal::from(HOURS_PER_YEAR);
    hourly
        .trunc()
        .to_u128()
        .ok_or_else(|| {
            CoreError::invalid_rate(format!("APR {apr_percent}% is not representable"))
        })
}

/// Converts an annual percentage rate into an FP32 hourly multiplier (>= `FP32`).
pub fn hourly_yield_fp_from_apr(apr_percent: Decimal) -> CoreResult<u128> {
    add(
        FP32,
        hourly_interest_fp_from_apr(apr_percent)?,
        "hourly_yield_fp_from_apr",
    )
}

/// Converts an FP32 hourly multiplier back into an annual percentage rate.
///
/// Used for logging and events; returns `None` if the value cannot be
/// represented as a `Decimal`.
pub fn hourly_yield_fp_to_apr(hourly_yield_fp: u128) -> Option<Decimal> {
    let interest = Decimal::from_u128(hourly_yield_fp.saturating_sub(FP32))?;
    interest
        .checked_mul(Decimal::from(HOURS_PER_YEAR))?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(Decimal::from(FP32 as u64))
}

/// Converts an FP32 value into a `Decimal` ratio (e.g. `FP32` -> `1`).
pub fn to_decimal(value_fp: u128) -> Option<Decimal> {
    Decimal::from_u128(value_fp)?.checked_div(Decimal::from(FP32 as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mul_div_rounds_down() {
        assert_eq!(mul_div(10, 3, 4).unwrap(), 7);
        assert_eq!(mul_div(0, u128::MAX, 1).unwrap(), 0);
    }

    #[test]
    fn test_mul_div_overflow() {
        let err = mul_div(u128::MAX, 2, 1).unwrap_err();
        assert_eq!(err, CoreError::overflow("mul_div"));
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert!(matches!(
            mul_div(1, 1, 0),
            Err(CoreError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_apply_interest_identity() {
        assert_eq!(apply_interest(12_345, FP32, FP32).unwrap(), 12_345);
    }

    #[test]
    fn test_sub_underflow_reports_operands() {
        let err = sub(5, 9, "debit").unwrap_err();
        assert_eq!(err, CoreError::underflow("debit", 5, 9));
    }

    #[test]
    fn test_apr_conversion() {
        // 876000% APR is exactly 1.0 of interest per hour.
        assert_eq!(hourly_interest_fp_from_apr(dec!(876000)).unwrap(), FP32);
        assert_eq!(hourly_yield_fp_from_apr(dec!(0)).unwrap(), FP32);

        let fp = hourly_interest_fp_from_apr(dec!(110)).unwrap();
        assert_eq!(fp, 539_322);
    }

    #[test]
    fn test_negative_apr_rejected() {
        assert!(matches!(
            hourly_interest_fp_from_apr(dec!(-1)),
            Err(CoreError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_apr_round_trip_is_close() {
        let fp = hourly_yield_fp_from_apr(dec!(12)).unwrap();
        let apr = hourly_yield_fp_to_apr(fp).unwrap();
        assert!((apr - dec!(12)).abs() < dec!(0.001));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(FP32 / 2).unwrap(), dec!(0.5));
    }
}
