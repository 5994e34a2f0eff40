//! Error types for lendcurve core arithmetic.
//!
//! Every fallible fixed-point operation reports through [`CoreError`] so that
//! callers can abort a ledger update before anything is committed.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The error type for core arithmetic and validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An intermediate product or sum did not fit in 128 bits.
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// The operation that overflowed.
        operation: &'static str,
    },

    /// A subtraction would have gone below zero.
    #[error("Arithmetic underflow in {operation}: {minuend} - {subtrahend}")]
    Underflow {
        /// The operation that underflowed.
        operation: &'static str,
        /// Value being subtracted from.
        minuend: u128,
        /// Value being subtracted.
        subtrahend: u128,
    },

    /// Division by a zero denominator.
    #[error("Division by zero in {operation}")]
    DivisionByZero {
        /// The operation that divided by zero.
        operation: &'static str,
    },

    /// A rate could not be converted to a fixed-point multiplier.
    #[error("Invalid rate: {reason}")]
    InvalidRate {
        /// Description of what's invalid.
        reason: String,
    },
}

impl CoreError {
    /// Creates an overflow error.
    #[must_use]
    pub fn overflow(operation: &'static str) -> Self {
        Self::Overflow { operation }
    }

    /// Creates an underflow error.
    #[must_use]
    pub fn underflow(operation: &'static str, minuend: u128, subtrahend: u128) -> Self {
        Self::Underflow {
            operation,
            minuend,
            subtrahend,
        }
    }

    /// Creates an invalid rate error.
    #[must_use]
    pub fn invalid_rate(reason: impl Into<String>) -> Self {
        Self::InvalidRate {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::underflow("debit_lending", 10, 20);
        assert_eq!(
            err.to_string(),
            "Arithmetic underflow in debit_lending: 10 - 20"
        );
    }

    #[test]
    fn test_overflow_display() {
        let err = CoreError::overflow("mul_div");
        assert!(err.to_string().contains("mul_div"));
    }
}
