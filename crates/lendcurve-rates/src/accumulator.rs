//! Compounding yield accumulator.
//!
//! An accumulator starts at `FP32` (1.0) and grows by an hourly multiplier.
//! Balances are recorded together with the accumulator value at the time
//! (their *yield quotient*); the interest owed later is
//! `balance * current / quotient`.

use lendcurve_core::error::{CoreError, CoreResult};
use lendcurve_core::fixed_point::{add, apply_interest, mul_div, FP32};
use lendcurve_core::types::{Timestamp, HOUR};
use serde::{Deserialize, Serialize};

/// Hours compounded exactly before growth switches to linear extrapolation.
pub const MAX_COMPOUNDED_HOURS: u64 = 48;

/// Accumulator state for one market side (hourly bonds or borrowing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldAccumulator {
    /// Current accumulator value, starts at `FP32`.
    pub accumulator_fp: u128,
    /// When `accumulator_fp` was last brought forward.
    pub last_updated: Timestamp,
    /// Hourly multiplier (>= `FP32`) applied from `last_updated` onward.
    pub hourly_yield_fp: u128,
}

impl YieldAccumulator {
    /// Creates an accumulator at 1.0 growing at `hourly_yield_fp`.
    pub fn new(hourly_yield_fp: u128, now: Timestamp) -> Self {
        Self {
            accumulator_fp: FP32,
            last_updated: now,
            hourly_yield_fp: hourly_yield_fp.max(FP32),
        }
    }

    /// Interest part of the hourly multiplier.
    pub fn hourly_interest_fp(&self) -> u128 {
        self.hourly_yield_fp.saturating_sub(FP32)
    }

    /// Accumulator value after `elapsed` more seconds at the current rate.
    ///
    /// Whole hours compound up to [`MAX_COMPOUNDED_HOURS`]; later hours repeat
    /// the last hourly gain. The trailing partial hour earns a pro-rata share
    /// of the next hour's gain, so the result never decreases with `elapsed`.
    pub fn cumulative_yield_fp(&self, elapsed: u64) -> CoreResult<u128> {
        let interest = self.hourly_interest_fp();
        let hours = elapsed / HOUR;
        let seconds = elapsed % HOUR;

        let mut accumulator = self.accumulator_fp;
        let mut last_gain = 0;
        for _ in 0..hours.min(MAX_COMPOUNDED_HOURS) {
            last_gain = mul_div(accumulator, interest, FP32)?;
            accumulator = add(accumulator, last_gain, "cumulative_yield_fp")?;
        }

        if hours > MAX_COMPOUNDED_HOURS {
            let linear = last_gain
                .checked_mul(u128::from(hours - MAX_COMPOUNDED_HOURS))
                .ok_or(CoreError::overflow("cumulative_yield_fp"))?;
            accumulator = add(accumulator, linear, "cumulative_yield_fp")?;
        }

        let next_gain = if hours >= MAX_COMPOUNDED_HOURS {
            last_gain
        } else {
            mul_div(accumulator, interest, FP32)?
        };
        let partial = mul_div(next_gain, u128::from(seconds), u128::from(HOUR))?;
        add(accumulator, partial, "cumulative_yield_fp")
    }

    /// Brings the accumulator forward to `now`. No-op if `now` is not later.
    pub fn accrue(&mut self, now: Timestamp) -> CoreResult<()> {
        if now > self.last_updated {
            self.accumulator_fp = self.cumulative_yield_fp(now - self.last_updated)?;
            self.last_updated = now;
        }
        Ok(())
    }

    /// Returns a copy brought forward to `now`, leaving `self` untouched.
    pub fn accrued(&self, now: Timestamp) -> CoreResult<Self> {
        let mut next = *self;
        next.accrue(now)?;
        Ok(next)
    }

    /// Accrues to `now`, then switches to a new hourly multiplier.
    pub fn reprice(&mut self, hourly_yield_fp: u128, now: Timestamp) -> CoreResult<()> {
        self.accrue(now)?;
        self.hourly_yield_fp = hourly_yield_fp.max(FP32);
        Ok(())
    }

    /// Grows a balance recorded at `yield_quotient_fp` to the current value.
    pub fn apply_to(&self, balance: u128, yield_quotient_fp: u128) -> CoreResult<u128> {
        apply_interest(balance, self.accumulator_fp, yield_quotient_fp)
    }
}
