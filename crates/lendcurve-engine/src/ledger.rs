//! Per-instrument ledger state.
//!
//! One [`InstrumentLedger`] holds everything that must change together for an
//! instrument: lending totals, the fixed-term bucket curve, the hourly bond
//! market and the borrow-side accumulator. The engine keeps each ledger behind
//! its own mutex, so operations on one instrument are serialized while
//! different instruments proceed independently.
//!
//! Mutating helpers here work on copies. Callers stage a new state, perform
//! the custody transfer, and only then write the staged values back.

use std::collections::HashMap;

use lendcurve_core::error::CoreResult;
use lendcurve_core::fixed_point::{add, apply_interest, sub, FP32};
use lendcurve_core::types::{Timestamp, HOUR};
use lendcurve_core::{AccountId, LendingMetadata};
use lendcurve_rates::{
    yield_ceiling_fp, BucketCurve, FlowSpeed, LendingTargetPolicy, RateParameters,
    YieldAccumulator, YieldAdjustment,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Hourly Market
// ============================================================================

/// Instrument-wide state of the hourly bond market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyMarket {
    /// Accumulator hourly bond balances grow with.
    pub accumulator: YieldAccumulator,
    /// Recent purchase volume.
    pub buying: FlowSpeed,
    /// Recent withdrawal volume.
    pub withdrawing: FlowSpeed,
    /// When the hourly rate was last re-evaluated.
    pub yield_last_updated: Timestamp,
    /// Sum of settled hourly-bond balances.
    pub total_lending: u128,
}

impl HourlyMarket {
    /// An empty market paying no interest.
    pub fn new(now: Timestamp) -> Self {
        Self {
            accumulator: YieldAccumulator::new(FP32, now),
            buying: FlowSpeed::new(now),
            withdrawing: FlowSpeed::new(now),
            yield_last_updated: now,
            total_lending: 0,
        }
    }

    /// Current hourly multiplier.
    pub fn hourly_yield_fp(&self) -> u128 {
        self.accumulator.hourly_yield_fp
    }
}

/// One holder's hourly bond position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyBond {
    /// Balance as of the last settlement.
    pub amount: u128,
    /// Accumulator value at the last settlement.
    pub yield_quotient_fp: u128,
    /// Second within the hour the position was opened; anchors the withdrawal window.
    pub modulo_hour: u64,
}

impl HourlyBond {
    /// Balance grown to `accumulator_fp`.
    pub fn balance(&self, accumulator_fp: u128) -> CoreResult<u128> {
        if self.amount == 0 {
            return Ok(0);
        }
        apply_interest(self.amount, accumulator_fp, self.yield_quotient_fp)
    }

    /// Seconds since the position's last hourly anniversary.
    pub fn seconds_into_hour(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.modulo_hour) % HOUR
    }
}

// ============================================================================
// Instrument Ledger
// ============================================================================

/// All mutable state of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentLedger {
    pub(crate) meta: LendingMetadata,
    pub(crate) curve: BucketCurve,
    pub(crate) hourly: HourlyMarket,
    pub(crate) accounts: HashMap<AccountId, HourlyBond>,
    pub(crate) borrow: YieldAccumulator,
}

impl InstrumentLedger {
    pub(crate) fn new(params: &RateParameters, now: Timestamp) -> Self {
        let hourly = HourlyMarket::new(now);
        Self {
            meta: LendingMetadata::new(),
            curve: BucketCurve::new(),
            hourly,
            accounts: HashMap::new(),
            borrow: YieldAccumulator::new(
                borrow_hourly_yield_fp(params, hourly.hourly_yield_fp()),
                now,
            ),
        }
    }

    /// Hourly account of `holder`, empty if none.
    pub(crate) fn account(&self, holder: &AccountId) -> HourlyBond {
        self.accounts.get(holder).copied().unwrap_or_default()
    }

    /// Writes back an account, dropping it once empty.
    pub(crate) fn store_account(&mut self, holder: &AccountId, account: HourlyBond) {
        if account.amount == 0 {
            self.accounts.remove(holder);
        } else {
            self.accounts.insert(holder.clone(), account);
        }
    }

    /// Hourly market brought forward to `now`.
    ///
    /// At most once per elapsed hour the accumulator is compounded at the old
    /// rate and the rate is then nudged toward the hourly share of the
    /// lending target.
    pub(crate) fn refreshed_hourly(
        &self,
        params: &RateParameters,
        policy: &dyn LendingTargetPolicy,
        now: Timestamp,
    ) -> CoreResult<HourlyMarket> {
        let mut market = self.hourly;
        if now <= market.yield_last_updated.saturating_add(HOUR) {
            return Ok(market);
        }

        market.accumulator.accrue(now)?;
        let adjustment = YieldAdjustment {
            yield_fp: market.accumulator.hourly_yield_fp,
            last_updated: market.yield_last_updated,
            total_lending: market.total_lending,
            target: policy.hourly_target(&self.meta, self.curve.hourly_weight())?,
            buying_speed: market.buying.current(HOUR, now, &params.speed)?,
            withdrawing_speed: market.withdrawing.current(HOUR, now, &params.speed)?,
            ceiling_fp: yield_ceiling_fp(
                params.max_hourly_yield_fp,
                self.borrow.hourly_yield_fp,
                self.meta.total_borrowed,
                self.meta.total_lending,
                1,
            )?,
            horizon_hours: 1,
        };
        market.accumulator.hourly_yield_fp =
            adjustment.updated_yield_fp(now, params.yield_change_per_hour_fp)?;
        market.yield_last_updated = now;
        Ok(market)
    }

    /// Borrow accumulator compounded to `now` and repriced from the hourly rate.
    pub(crate) fn refreshed_borrow(
        &self,
        params: &RateParameters,
        now: Timestamp,
    ) -> CoreResult<YieldAccumulator> {
        let mut borrow = self.borrow;
        borrow.reprice(
            borrow_hourly_yield_fp(params, self.hourly.hourly_yield_fp()),
            now,
        )?;
        Ok(borrow)
    }
}

/// Hourly rate charged to borrowers: the hourly bond rate plus markup, never
/// below the configured minimum.
pub fn borrow_hourly_yield_fp(params: &RateParameters, hourly_bond_yield_fp: u128) -> u128 {
    hourly_bond_yield_fp
        .saturating_add(params.borrowing_markup_fp)
        .max(params.borrow_min_hourly_yield_fp)
}

// ============================================================================
// Staged account moves
// ============================================================================

/// Folds accrued interest into `account`, booking it as lending.
pub(crate) fn settle_hourly(
    market: &mut HourlyMarket,
    meta: &mut LendingMetadata,
    account: &mut HourlyBond,
) -> CoreResult<()> {
    let accumulator_fp = market.accumulator.accumulator_fp;
    let grown = account.balance(accumulator_fp)?;
    let interest = sub(grown, account.amount, "hourly_settle")?;
    market.total_lending = add(market.total_lending, interest, "hourly_settle")?;
    meta.credit_lending(interest)?;
    account.amount = grown;
    account.yield_quotient_fp = accumulator_fp;
    Ok(())
}

/// Adds `amount` to an hourly position.
pub(crate) fn credit_hourly(
    market: &mut HourlyMarket,
    meta: &mut LendingMetadata,
    account: &mut HourlyBond,
    amount: u128,
    now: Timestamp,
    params: &RateParameters,
) -> CoreResult<()> {
    settle_hourly(market, meta, account)?;
    if account.amount == 0 {
        account.modulo_hour = now % HOUR;
    }
    account.amount = add(account.amount, amount, "hourly_credit")?;
    market.total_lending = add(market.total_lending, amount, "hourly_credit")?;
    meta.credit_lending(amount)?;
    market.buying.record(amount, HOUR, now, &params.speed)
}

/// Removes `amount` from an hourly position that has already been settled.
pub(crate) fn debit_hourly(
    market: &mut HourlyMarket,
    meta: &mut LendingMetadata,
    account: &mut HourlyBond,
    amount: u128,
    now: Timestamp,
    params: &RateParameters,
) -> CoreResult<()> {
    account.amount = sub(account.amount, amount, "hourly_debit")?;
    market.total_lending = sub(market.total_lending, amount, "hourly_debit")?;
    meta.debit_lending(amount)?;
    market.withdrawing.record(amount, HOUR, now, &params.speed)
}

/// Settled balance of `account` without changing anything.
pub(crate) fn settled_balance(market: &HourlyMarket, account: &HourlyBond) -> CoreResult<u128> {
    account.balance(market.accumulator.accumulator_fp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendcurve_rates::CapBufferTarget;

    fn params() -> RateParameters {
        RateParameters::default()
    }

    #[test]
    fn test_new_ledger_borrow_rate_is_minimum() {
        let p = params();
        let ledger = InstrumentLedger::new(&p, 0);
        assert_eq!(ledger.borrow.hourly_yield_fp, p.borrow_min_hourly_yield_fp);
        assert_eq!(ledger.hourly.hourly_yield_fp(), FP32);
    }

    #[test]
    fn test_credit_and_debit_keep_totals_in_step() {
        let p = params();
        let mut market = HourlyMarket::new(0);
        let mut meta = LendingMetadata::new();
        let mut account = HourlyBond::default();

        credit_hourly(&mut market, &mut meta, &mut account, 500, 7_300, &p).unwrap();
        assert_eq!(account.amount, 500);
        assert_eq!(account.modulo_hour, 100);
        assert_eq!(market.total_lending, 500);
        assert_eq!(meta.total_lending, 500);

        debit_hourly(&mut market, &mut meta, &mut account, 200, 7_300, &p).unwrap();
        assert_eq!(account.amount, 300);
        assert_eq!(market.total_lending, 300);
        assert_eq!(meta.total_lending, 300);
        assert!(debit_hourly(&mut market, &mut meta, &mut account, 301, 7_300, &p).is_err());
    }

    #[test]
    fn test_settle_books_interest() {
        let p = params();
        let mut market = HourlyMarket::new(0);
        let mut meta = LendingMetadata::new();
        let mut account = HourlyBond::default();
        credit_hourly(&mut market, &mut meta, &mut account, 1_000, 0, &p).unwrap();

        // Accumulator doubled since the account was opened.
        market.accumulator.accumulator_fp = FP32 * 2;
        assert_eq!(settled_balance(&market, &account).unwrap(), 2_000);

        settle_hourly(&mut market, &mut meta, &mut account).unwrap();
        assert_eq!(account.amount, 2_000);
        assert_eq!(account.yield_quotient_fp, FP32 * 2);
        assert_eq!(market.total_lending, 2_000);
        assert_eq!(meta.total_lending, 2_000);
    }

    #[test]
    fn test_refresh_is_gated_to_once_per_hour() {
        let p = params();
        let policy = CapBufferTarget::default();
        let mut ledger = InstrumentLedger::new(&p, 0);
        ledger.hourly.accumulator.hourly_yield_fp = FP32 + 1_000;

        let early = ledger.refreshed_hourly(&p, &policy, HOUR).unwrap();
        assert_eq!(early, ledger.hourly);

        let later = ledger.refreshed_hourly(&p, &policy, 2 * HOUR).unwrap();
        assert!(later.accumulator.accumulator_fp > FP32);
        assert_eq!(later.yield_last_updated, 2 * HOUR);
        assert!(later.hourly_yield_fp() >= FP32);
    }

    #[test]
    fn test_window_position() {
        let account = HourlyBond {
            amount: 1,
            yield_quotient_fp: FP32,
            modulo_hour: 600,
        };
        assert_eq!(account.seconds_into_hour(HOUR + 600), 0);
        assert_eq!(account.seconds_into_hour(HOUR + 1_800), 1_200);
    }

    #[test]
    fn test_borrow_rate_tracks_hourly_plus_markup() {
        let p = params();
        let high = FP32 + 100_000;
        assert_eq!(borrow_hourly_yield_fp(&p, high), high + p.borrowing_markup_fp);
        assert_eq!(borrow_hourly_yield_fp(&p, FP32), p.borrow_min_hourly_yield_fp);
    }
}
