//! Tunable rate parameters.
//!
//! Every value is already in engine units (FP32 per hour, seconds). Converting
//! from human-facing APR percentages happens in `lendcurve-config`.

use lendcurve_core::types::{HOUR, HOURS_PER_YEAR};
use lendcurve_core::FP32;
use serde::{Deserialize, Serialize};

/// FP32 interest per hour for a whole-percent APR, truncated.
const fn hourly_interest_for_apr(apr_percent: u128) -> u128 {
    FP32 * apr_percent / 100 / HOURS_PER_YEAR as u128
}

/// Weighting of the stored speed against a new observation.
///
/// The stored reading is worth `(runtime + weight_offset) / weight_divisor`
/// seconds of history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedParams {
    /// Seconds added to the runtime before dividing.
    pub weight_offset: u64,
    /// Divisor applied to `runtime + weight_offset`. Must be non-zero.
    pub weight_divisor: u64,
}

impl Default for SpeedParams {
    fn default() -> Self {
        Self {
            weight_offset: 2 * HOUR,
            weight_divisor: 3,
        }
    }
}

/// Rate parameters shared by all instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateParameters {
    /// Upper bound on any hourly multiplier (>= `FP32`).
    pub max_hourly_yield_fp: u128,
    /// How far a quoted yield moves per hour of elapsed time, per hour of runtime.
    pub yield_change_per_hour_fp: u128,
    /// Hourly interest used to seed a new bucket's yield.
    pub seed_hourly_interest_fp: u128,
    /// Hourly interest borrowers pay on top of the hourly bond yield.
    pub borrowing_markup_fp: u128,
    /// Lowest hourly multiplier charged to borrowers.
    pub borrow_min_hourly_yield_fp: u128,
    /// Seconds after each hourly anniversary during which hourly bonds may be withdrawn.
    pub withdrawal_window: u64,
    /// Flow-speed weighting.
    pub speed: SpeedParams,
}

impl Default for RateParameters {
    fn default() -> Self {
        Self {
            max_hourly_yield_fp: FP32 + hourly_interest_for_apr(200),
            yield_change_per_hour_fp: hourly_interest_for_apr(1),
            seed_hourly_interest_fp: hourly_interest_for_apr(110),
            borrowing_markup_fp: hourly_interest_for_apr(3),
            borrow_min_hourly_yield_fp: FP32 + hourly_interest_for_apr(6),
            withdrawal_window: 20 * 60,
            speed: SpeedParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_matches_110_percent() {
        let params = RateParameters::default();
        assert_eq!(params.seed_hourly_interest_fp, 539_322);
        assert!(params.max_hourly_yield_fp > FP32);
        assert!(params.borrow_min_hourly_yield_fp > FP32);
    }

    #[test]
    fn test_speed_defaults() {
        let speed = SpeedParams::default();
        assert_eq!(speed.weight_offset, 7_200);
        assert_eq!(speed.weight_divisor, 3);
    }
}
