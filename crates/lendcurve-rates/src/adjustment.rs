//! Occupancy-driven yield adjustment.
//!
//! A quoted yield drifts by `yield_change_per_hour * elapsed / HOUR`, scaled
//! by the runtime in hours. It drifts down while the bucket is under its
//! lending target and buyers are at least as active as withdrawers, and up
//! otherwise. Downward moves stop at `FP32`; upward moves stop at the ceiling
//! returned by [`yield_ceiling_fp`].

use lendcurve_core::error::{CoreError, CoreResult};
use lendcurve_core::fixed_point::{add, mul_div, FP32};
use lendcurve_core::types::{Timestamp, HOUR};
use serde::{Deserialize, Serialize};

/// Which way a yield is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YieldDirection {
    /// Toward the no-interest floor.
    Down,
    /// Toward the ceiling.
    Up,
}

/// Inputs for one yield update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldAdjustment {
    /// Yield currently stored (FP32 multiplier over the horizon).
    pub yield_fp: u128,
    /// When `yield_fp` was stored.
    pub last_updated: Timestamp,
    /// Lending in the bucket, including any amount about to be added.
    pub total_lending: u128,
    /// Lending the bucket should hold.
    pub target: u128,
    /// Current buying speed.
    pub buying_speed: u128,
    /// Current withdrawing speed.
    pub withdrawing_speed: u128,
    /// Upper bound for upward moves.
    pub ceiling_fp: u128,
    /// Hours the yield covers; scales the per-hour step.
    pub horizon_hours: u64,
}

impl YieldAdjustment {
    /// Direction of the next move.
    pub fn direction(&self) -> YieldDirection {
        if self.total_lending < self.target && self.buying_speed >= self.withdrawing_speed {
            YieldDirection::Down
        } else {
            YieldDirection::Up
        }
    }

    /// Size of the move after `now - last_updated` seconds.
    pub fn step_fp(&self, now: Timestamp, change_per_hour_fp: u128) -> CoreResult<u128> {
        let elapsed = u128::from(now.saturating_sub(self.last_updated));
        let per_horizon = change_per_hour_fp
            .checked_mul(u128::from(self.horizon_hours))
            .ok_or(CoreError::overflow("yield_step"))?;
        mul_div(elapsed, per_horizon, u128::from(HOUR))
    }

    /// The adjusted yield at `now`.
    ///
    /// Calling again with the same `now` and the stored result as `yield_fp`
    /// returns the same value.
    pub fn updated_yield_fp(&self, now: Timestamp, change_per_hour_fp: u128) -> CoreResult<u128> {
        let step = self.step_fp(now, change_per_hour_fp)?;
        match self.direction() {
            YieldDirection::Down => Ok(self.yield_fp.saturating_sub(step).max(FP32)),
            YieldDirection::Up => {
                let raised = add(self.yield_fp, step, "yield_adjustment")?;
                Ok(raised.min(self.ceiling_fp).max(FP32))
            }
        }
    }
}

/// Highest yield a market can quote over `horizon_hours`.
///
/// The hourly interest is capped both by `max_hourly_yield_fp` and by what
/// borrowers generate: `(borrow_hourly - 1) * borrowed / (1 + lending)`.
pub fn yield_ceiling_fp(
    max_hourly_yield_fp: u128,
    borrow_hourly_yield_fp: u128,
    total_borrowed: u128,
    total_lending: u128,
    horizon_hours: u64,
) -> CoreResult<u128> {
    let generated = mul_div(
        borrow_hourly_yield_fp.saturating_sub(FP32),
        total_borrowed,
        add(total_lending, 1, "yield_ceiling")?,
    )?;
    let hourly = max_hourly_yield_fp.saturating_sub(FP32).min(generated);
    let interest = hourly
        .checked_mul(u128::from(horizon_hours))
        .ok_or(CoreError::overflow("yield_ceiling"))?;
    add(FP32, interest, "yield_ceiling")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjustment(total_lending: u128, target: u128) -> YieldAdjustment {
        YieldAdjustment {
            yield_fp: FP32 + 1_000_000,
            last_updated: 0,
            total_lending,
            target,
            buying_speed: 10,
            withdrawing_speed: 5,
            ceiling_fp: FP32 + 1_500_000,
            horizon_hours: 10,
        }
    }

    #[test]
    fn test_under_target_moves_down() {
        let adj = adjustment(100, 1_000);
        assert_eq!(adj.direction(), YieldDirection::Down);
        // 1 hour at 1_000 per hour over a 10 hour horizon.
        assert_eq!(adj.updated_yield_fp(HOUR, 1_000).unwrap(), FP32 + 990_000);
    }

    #[test]
    fn test_over_target_moves_up_to_ceiling() {
        let adj = adjustment(2_000, 1_000);
        assert_eq!(adj.direction(), YieldDirection::Up);
        assert_eq!(adj.updated_yield_fp(HOUR, 1_000).unwrap(), FP32 + 1_010_000);
        assert_eq!(
            adj.updated_yield_fp(1_000 * HOUR, 1_000).unwrap(),
            FP32 + 1_500_000
        );
    }

    #[test]
    fn test_withdraw_pressure_moves_up() {
        let mut adj = adjustment(100, 1_000);
        adj.withdrawing_speed = 11;
        assert_eq!(adj.direction(), YieldDirection::Up);
    }

    #[test]
    fn test_floor_at_one() {
        let adj = adjustment(0, 1_000);
        assert_eq!(adj.updated_yield_fp(10_000 * HOUR, 1_000).unwrap(), FP32);
    }

    #[test]
    fn test_idempotent_at_same_time() {
        let adj = adjustment(100, 1_000);
        let once = adj.updated_yield_fp(HOUR, 1_000).unwrap();
        let again = YieldAdjustment {
            yield_fp: once,
            last_updated: HOUR,
            ..adj
        };
        assert_eq!(again.updated_yield_fp(HOUR, 1_000).unwrap(), once);
    }

    #[test]
    fn test_ceiling_without_borrowing_is_one() {
        let ceiling = yield_ceiling_fp(FP32 + 5_000, FP32 + 3_000, 0, 1_000, 24).unwrap();
        assert_eq!(ceiling, FP32);
    }

    #[test]
    fn test_ceiling_capped_by_max() {
        // Borrowers generate far more than the cap allows.
        let ceiling =
            yield_ceiling_fp(FP32 + 5_000, FP32 + 1_000_000, 1_000, 999, 24).unwrap();
        assert_eq!(ceiling, FP32 + 5_000 * 24);
    }

    #[test]
    fn test_ceiling_follows_utilisation() {
        let ceiling = yield_ceiling_fp(FP32 + 5_000, FP32 + 2_000, 500, 999, 10).unwrap();
        assert_eq!(ceiling, FP32 + 1_000 * 10);
    }
}
