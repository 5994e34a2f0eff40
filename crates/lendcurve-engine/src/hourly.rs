//! Hourly bond market.
//!
//! Hourly bonds are open-ended deposits that grow with the instrument's
//! hourly accumulator. They can be withdrawn only during the first
//! `withdrawal_window` seconds of each hour counted from when the position
//! was opened.

use lendcurve_core::fixed_point::hourly_yield_fp_from_apr;
use lendcurve_core::{AccountId, InstrumentId};
use lendcurve_traits::{LendingEvent, Role};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::ledger::{
    borrow_hourly_yield_fp, credit_hourly, debit_hourly, settle_hourly, settled_balance,
};
use crate::LendingEngine;

impl LendingEngine {
    /// Deposits `amount` into `holder`'s hourly bond account.
    pub fn buy_hourly_bond(
        &self,
        holder: &AccountId,
        issuer: &InstrumentId,
        amount: u128,
    ) -> EngineResult<()> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        self.ensure_active(issuer)?;
        let token = self.token_for(issuer)?;
        let params = self.rate_parameters();
        let now = self.now();

        self.with_ledger(issuer, &params, now, |ledger| {
            let mut market = ledger.refreshed_hourly(&params, self.target_policy.as_ref(), now)?;
            let mut meta = ledger.meta;
            let mut account = ledger.account(holder);
            credit_hourly(&mut market, &mut meta, &mut account, amount, now, &params)?;
            if meta.exceeds_cap() {
                return Err(EngineError::LendingCapExceeded {
                    instrument: issuer.clone(),
                    cap: meta.lending_cap,
                    requested: meta.total_lending,
                });
            }

            self.fund.deposit_for(holder, &token, amount)?;
            ledger.meta = meta;
            ledger.hourly = market;
            ledger.store_account(holder, account);
            Ok(())
        })?;

        info!(holder = %holder, instrument = %issuer, amount = %amount, "hourly bond bought");
        self.publish(LendingEvent::HourlyBondBought {
            instrument: issuer.clone(),
            holder: holder.clone(),
            amount,
        });
        Ok(())
    }

    /// Withdraws `amount` from `holder`'s hourly bond account.
    pub fn withdraw_hourly_bond(
        &self,
        holder: &AccountId,
        issuer: &InstrumentId,
        amount: u128,
    ) -> EngineResult<()> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        self.withdraw_hourly(holder, issuer, Some(amount)).map(|_| ())
    }

    /// Withdraws the whole settled balance and returns it.
    pub fn close_hourly_bond_account(
        &self,
        holder: &AccountId,
        issuer: &InstrumentId,
    ) -> EngineResult<u128> {
        self.withdraw_hourly(holder, issuer, None)
    }

    fn withdraw_hourly(
        &self,
        holder: &AccountId,
        issuer: &InstrumentId,
        requested: Option<u128>,
    ) -> EngineResult<u128> {
        let token = self.token_for(issuer)?;
        let params = self.rate_parameters();
        let now = self.now();

        let handle = self.existing_ledger(issuer)?;
        let mut ledger = handle.lock();
        let mut market = ledger.refreshed_hourly(&params, self.target_policy.as_ref(), now)?;
        let mut meta = ledger.meta;
        let mut account = ledger.account(holder);
        settle_hourly(&mut market, &mut meta, &mut account)?;

        let amount = requested.unwrap_or(account.amount);
        if amount == 0 || amount > account.amount {
            return Err(EngineError::InsufficientHourlyBalance {
                instrument: issuer.clone(),
                holder: holder.clone(),
                requested: amount,
                available: account.amount,
            });
        }
        let seconds_into_hour = account.seconds_into_hour(now);
        if seconds_into_hour > params.withdrawal_window {
            return Err(EngineError::OutsideWithdrawalWindow {
                seconds_into_hour,
                window: params.withdrawal_window,
            });
        }

        debit_hourly(&mut market, &mut meta, &mut account, amount, now, &params)?;
        if !meta.is_solvent() {
            return Err(EngineError::insufficient_liquidity(
                issuer,
                format!(
                    "withdrawal would leave {} borrowed against {} lent",
                    meta.total_borrowed, meta.total_lending
                ),
            ));
        }
        let custody_balance = self.fund.balance(&token);
        if custody_balance < amount {
            return Err(EngineError::insufficient_liquidity(
                issuer,
                format!("custody holds {custody_balance}, {amount} requested"),
            ));
        }

        self.fund.withdraw(&token, holder, amount)?;
        ledger.meta = meta;
        ledger.hourly = market;
        ledger.store_account(holder, account);
        drop(ledger);

        info!(holder = %holder, instrument = %issuer, amount = %amount, "hourly bond withdrawn");
        self.publish(LendingEvent::HourlyBondWithdrawn {
            instrument: issuer.clone(),
            holder: holder.clone(),
            amount,
        });
        Ok(amount)
    }

    /// Settled hourly bond balance of `holder`, including accrued interest.
    pub fn view_hourly_bond_amount(
        &self,
        holder: &AccountId,
        issuer: &InstrumentId,
    ) -> EngineResult<u128> {
        let params = self.rate_parameters();
        let handle = self.existing_ledger(issuer)?;
        let ledger = handle.lock();
        let market = ledger.refreshed_hourly(&params, self.target_policy.as_ref(), self.now())?;
        Ok(settled_balance(&market, &ledger.account(holder))?)
    }

    /// Sets the hourly bond rate from an APR and returns the FP32 multiplier.
    ///
    /// Interest up to now is compounded at the previous rate first. The
    /// borrow rate is repriced along with it.
    pub fn set_hourly_yield_apr(
        &self,
        caller: &AccountId,
        issuer: &InstrumentId,
        apr_percent: Decimal,
    ) -> EngineResult<u128> {
        self.authorize(caller, Role::TokenActivator)?;
        let hourly_yield_fp = hourly_yield_fp_from_apr(apr_percent)?;
        let params = self.rate_parameters();
        let now = self.now();

        self.with_ledger(issuer, &params, now, |ledger| {
            let mut market = ledger.hourly;
            market.accumulator.reprice(hourly_yield_fp, now)?;
            market.yield_last_updated = now;
            let mut borrow = ledger.borrow;
            borrow.reprice(borrow_hourly_yield_fp(&params, hourly_yield_fp), now)?;
            ledger.hourly = market;
            ledger.borrow = borrow;
            Ok(())
        })?;

        info!(instrument = %issuer, apr = %apr_percent, hourly_yield_fp = %hourly_yield_fp, "hourly yield set");
        self.publish(LendingEvent::HourlyYieldSet {
            instrument: issuer.clone(),
            hourly_yield_fp,
        });
        Ok(hourly_yield_fp)
    }
}
