//! Time-decayed flow speed.
//!
//! A [`FlowSpeed`] summarises how fast capital has recently been moving in one
//! direction (buying or withdrawing) for one bucket. Each observation is
//! normalised by the runtime it relates to, and the stored value decays as
//! time passes without activity.

use lendcurve_core::error::{CoreError, CoreResult};
use lendcurve_core::fixed_point::{add, mul_div};
use lendcurve_core::types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::params::SpeedParams;

/// A speed reading plus the time of the last action that moved it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSpeed {
    /// Stored speed value.
    pub speed: u128,
    /// Time of the last observation.
    pub last_action: Timestamp,
}

impl FlowSpeed {
    /// A fresh speed of one unit, so that ratios never start at zero.
    pub fn new(now: Timestamp) -> Self {
        Self {
            speed: 1,
            last_action: now,
        }
    }

    fn history_weight(runtime: u64, params: &SpeedParams) -> CoreResult<u128> {
        if params.weight_divisor == 0 {
            return Err(CoreError::DivisionByZero {
                operation: "speed_weight",
            });
        }
        let weight = (u128::from(runtime) + u128::from(params.weight_offset))
            / u128::from(params.weight_divisor);
        Ok(weight.max(1))
    }

    /// Speed as seen at `now`: the stored value blended with a zero-amount
    /// observation, i.e. `speed * w / (w + elapsed + 1)`.
    pub fn current(&self, runtime: u64, now: Timestamp, params: &SpeedParams) -> CoreResult<u128> {
        let mut reading = *self;
        reading.record(0, runtime, now, params)?;
        Ok(reading.speed)
    }

    /// Blends an observation of `amount` over `runtime` seconds into the speed.
    pub fn record(
        &mut self,
        amount: u128,
        runtime: u64,
        now: Timestamp,
        params: &SpeedParams,
    ) -> CoreResult<()> {
        let elapsed_weight = u128::from(now.saturating_sub(self.last_action)) + 1;
        let observed = mul_div(amount, u128::from(runtime), elapsed_weight)?;
        let weight = Self::history_weight(runtime, params)?;

        let stored = self
            .speed
            .checked_mul(weight)
            .ok_or(CoreError::overflow("speed_record"))?;
        let incoming = observed
            .checked_mul(elapsed_weight)
            .ok_or(CoreError::overflow("speed_record"))?;

        let total_weight = add(weight, elapsed_weight, "speed_record")?;
        self.speed = add(stored, incoming, "speed_record")? / total_weight;
        self.last_action = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendcurve_core::types::DAY;

    #[test]
    fn test_new_speed_is_one() {
        let speed = FlowSpeed::new(10);
        assert_eq!(speed.speed, 1);
        assert_eq!(speed.last_action, 10);
    }

    #[test]
    fn test_current_is_a_zero_amount_update() {
        let speed = FlowSpeed {
            speed: 500,
            last_action: 100,
        };
        let params = SpeedParams::default();
        let weight = (DAY as u128 + 7_200) / 3;

        // Same second: the stored value still gives up one second of weight.
        assert_eq!(
            speed.current(DAY, 100, &params).unwrap(),
            500 * weight / (weight + 1)
        );
        assert_eq!(
            speed.current(DAY, 160, &params).unwrap(),
            500 * weight / (weight + 61)
        );

        let mut recorded = speed;
        recorded.record(0, DAY, 160, &params).unwrap();
        assert_eq!(speed.current(DAY, 160, &params).unwrap(), recorded.speed);
    }

    #[test]
    fn test_current_decays() {
        let speed = FlowSpeed {
            speed: 1_000_000,
            last_action: 0,
        };
        let params = SpeedParams::default();
        let early = speed.current(DAY, 60, &params).unwrap();
        let late = speed.current(DAY, DAY, &params).unwrap();
        assert!(early < 1_000_000);
        assert!(late < early);
    }

    #[test]
    fn test_record_moves_toward_observation() {
        let params = SpeedParams::default();
        let mut speed = FlowSpeed::new(0);
        speed.record(1_000, 30 * DAY, 0, &params).unwrap();

        // Same-second observation: weight of the new value is one second.
        let weight = (30 * DAY as u128 + 7_200) / 3;
        let observed = 1_000 * 30 * DAY as u128;
        assert_eq!(speed.speed, (weight + observed) / (weight + 1));
        assert_eq!(speed.last_action, 0);
    }

    #[test]
    fn test_zero_divisor_is_an_error() {
        let params = SpeedParams {
            weight_offset: 0,
            weight_divisor: 0,
        };
        let speed = FlowSpeed::new(0);
        assert!(speed.current(DAY, 10, &params).is_err());
    }
}
