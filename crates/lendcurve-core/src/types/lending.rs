//! Per-instrument lending aggregate.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::fixed_point::{add, sub};

/// Total-lending / total-borrowed / cap bookkeeping for one instrument.
///
/// Shared by the fixed-term and hourly bond ledgers and by the borrow side.
/// `total_lending` counts fixed-term bonds at the midpoint of principal and
/// promised return, plus hourly-bond balances including accrued interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingMetadata {
    /// Capital committed by lenders.
    pub total_lending: u128,
    /// Capital currently borrowed against the pool.
    pub total_borrowed: u128,
    /// Upper bound on `total_lending` for new deposits.
    pub lending_cap: u128,
}

impl Default for LendingMetadata {
    fn default() -> Self {
        Self {
            total_lending: 0,
            total_borrowed: 0,
            lending_cap: u128::MAX,
        }
    }
}

impl LendingMetadata {
    /// Creates empty, uncapped metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if borrowing is fully covered by lending.
    pub fn is_solvent(&self) -> bool {
        self.total_borrowed <= self.total_lending
    }

    /// Returns true if `total_lending` exceeds the cap.
    pub fn exceeds_cap(&self) -> bool {
        self.total_lending > self.lending_cap
    }

    /// Lending not currently borrowed.
    pub fn available(&self) -> u128 {
        self.total_lending.saturating_sub(self.total_borrowed)
    }

    /// Adds `amount` to total lending.
    pub fn credit_lending(&mut self, amount: u128) -> CoreResult<()> {
        self.total_lending = add(self.total_lending, amount, "credit_lending")?;
        Ok(())
    }

    /// Removes `amount` from total lending.
    pub fn debit_lending(&mut self, amount: u128) -> CoreResult<()> {
        self.total_lending = sub(self.total_lending, amount, "debit_lending")?;
        Ok(())
    }

    /// Adds `amount` to total borrowed.
    pub fn credit_borrowed(&mut self, amount: u128) -> CoreResult<()> {
        self.total_borrowed = add(self.total_borrowed, amount, "credit_borrowed")?;
        Ok(())
    }

    /// Removes up to `amount` from total borrowed.
    ///
    /// Repayments larger than the outstanding total clear it to zero.
    pub fn debit_borrowed(&mut self, amount: u128) {
        self.total_borrowed = self.total_borrowed.saturating_sub(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_default_is_uncapped_and_solvent() {
        let meta = LendingMetadata::new();
        assert_eq!(meta.lending_cap, u128::MAX);
        assert!(meta.is_solvent());
        assert!(!meta.exceeds_cap());
    }

    #[test]
    fn test_credit_and_debit() {
        let mut meta = LendingMetadata::new();
        meta.credit_lending(1_000).unwrap();
        meta.credit_borrowed(400).unwrap();
        assert_eq!(meta.available(), 600);

        meta.debit_lending(700).unwrap();
        assert!(!meta.is_solvent());

        meta.debit_borrowed(1_000);
        assert_eq!(meta.total_borrowed, 0);
    }

    #[test]
    fn test_debit_lending_underflow() {
        let mut meta = LendingMetadata::new();
        meta.credit_lending(10).unwrap();
        let err = meta.debit_lending(11).unwrap_err();
        assert!(matches!(err, CoreError::Underflow { .. }));
        assert_eq!(meta.total_lending, 10);
    }
}
