//! Borrow-side accounting.
//!
//! The margin side registers debt against the pool and periodically books
//! interest on it. Borrowers pay the hourly bond rate plus a markup, never
//! less than a configured minimum. Borrowing is only accepted while it stays
//! covered by lending.

use lendcurve_core::fixed_point::sub;
use lendcurve_core::{AccountId, InstrumentId};
use lendcurve_traits::{LendingEvent, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::ledger::borrow_hourly_yield_fp;
use crate::LendingEngine;

/// A borrower's balance after compounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowInterest {
    /// Balance including interest.
    pub balance: u128,
    /// Accumulator value to store with the balance.
    pub yield_quotient_fp: u128,
}

impl LendingEngine {
    /// Registers `amount` of new borrowing and returns the yield quotient to
    /// record with it.
    pub fn register_borrow(
        &self,
        caller: &AccountId,
        issuer: &InstrumentId,
        amount: u128,
    ) -> EngineResult<u128> {
        self.authorize(caller, Role::Borrower)?;
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        self.ensure_active(issuer)?;
        let params = self.rate_parameters();
        let now = self.now();

        let handle = self
            .existing_ledger(issuer)
            .map_err(|_| EngineError::insufficient_liquidity(issuer, "nothing has been lent"))?;
        let mut ledger = handle.lock();
        let borrow = ledger.refreshed_borrow(&params, now)?;
        let mut meta = ledger.meta;
        meta.credit_borrowed(amount)?;
        if !meta.is_solvent() {
            return Err(EngineError::insufficient_liquidity(
                issuer,
                format!(
                    "borrowing {} would exceed lending {}",
                    meta.total_borrowed, meta.total_lending
                ),
            ));
        }
        ledger.meta = meta;
        ledger.borrow = borrow;
        drop(ledger);

        info!(instrument = %issuer, amount = %amount, "borrow registered");
        self.publish(LendingEvent::BorrowRegistered {
            instrument: issuer.clone(),
            amount,
        });
        Ok(borrow.accumulator_fp)
    }

    /// Records a repayment. Repaying more than is outstanding clears it.
    pub fn pay_off(&self, caller: &AccountId, issuer: &InstrumentId, amount: u128) -> EngineResult<()> {
        self.authorize(caller, Role::Borrower)?;
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        let params = self.rate_parameters();
        let now = self.now();

        let handle = self.existing_ledger(issuer)?;
        let mut ledger = handle.lock();
        let borrow = ledger.refreshed_borrow(&params, now)?;
        ledger.meta.debit_borrowed(amount);
        ledger.borrow = borrow;
        drop(ledger);

        info!(instrument = %issuer, amount = %amount, "borrow repaid");
        self.publish(LendingEvent::BorrowRepaid {
            instrument: issuer.clone(),
            amount,
        });
        Ok(())
    }

    /// Compounds a borrower's `balance` recorded at `yield_quotient_fp` and
    /// books the interest as borrowing.
    pub fn apply_borrow_interest(
        &self,
        caller: &AccountId,
        issuer: &InstrumentId,
        balance: u128,
        yield_quotient_fp: u128,
    ) -> EngineResult<BorrowInterest> {
        self.authorize(caller, Role::Borrower)?;
        let params = self.rate_parameters();
        let now = self.now();

        let handle = self.existing_ledger(issuer)?;
        let mut ledger = handle.lock();
        let borrow = ledger.refreshed_borrow(&params, now)?;
        let grown = borrow.apply_to(balance, yield_quotient_fp)?;
        let interest = sub(grown, balance, "apply_borrow_interest")?;
        let mut meta = ledger.meta;
        meta.credit_borrowed(interest)?;
        ledger.meta = meta;
        ledger.borrow = borrow;
        drop(ledger);

        debug!(instrument = %issuer, balance = %grown, interest = %interest, "borrow interest applied");
        Ok(BorrowInterest {
            balance: grown,
            yield_quotient_fp: borrow.accumulator_fp,
        })
    }

    /// What [`apply_borrow_interest`](Self::apply_borrow_interest) would return, without booking it.
    pub fn view_borrow_interest(
        &self,
        issuer: &InstrumentId,
        balance: u128,
        yield_quotient_fp: u128,
    ) -> EngineResult<u128> {
        let params = self.rate_parameters();
        let handle = self.existing_ledger(issuer)?;
        let ledger = handle.lock();
        let borrow = ledger.refreshed_borrow(&params, self.now())?;
        Ok(borrow.apply_to(balance, yield_quotient_fp)?)
    }

    /// Hourly multiplier borrowers are charged right now.
    pub fn borrow_hourly_yield_fp(&self, issuer: &InstrumentId) -> EngineResult<u128> {
        let params = self.rate_parameters();
        let handle = self.existing_ledger(issuer)?;
        let hourly = handle.lock().hourly.hourly_yield_fp();
        Ok(borrow_hourly_yield_fp(&params, hourly))
    }
}
