//! Lending target policy.
//!
//! The lending target is the amount of lending an instrument should attract.
//! Bucket targets are weighted shares of it; the hourly market gets the rest.

use lendcurve_core::fixed_point::mul_div;
use lendcurve_core::{CoreResult, LendingMetadata};
use serde::{Deserialize, Serialize};

use crate::buckets::WEIGHT_TOTAL;

/// Decides how much lending an instrument should hold.
pub trait LendingTargetPolicy: Send + Sync {
    /// Target total lending for an instrument in the given state.
    fn lending_target(&self, meta: &LendingMetadata) -> u128;

    /// Share of the target assigned to the hourly market.
    fn hourly_target(&self, meta: &LendingMetadata, hourly_weight: u32) -> CoreResult<u128> {
        mul_div(
            self.lending_target(meta),
            u128::from(hourly_weight),
            u128::from(WEIGHT_TOTAL),
        )
    }
}

/// Target of `borrowed + buffer`, never above the lending cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapBufferTarget {
    /// Spare lending wanted on top of current borrowing.
    pub buffer: u128,
}

impl Default for CapBufferTarget {
    fn default() -> Self {
        Self { buffer: 10_000 }
    }
}

impl CapBufferTarget {
    /// Creates a policy with the given buffer.
    pub fn new(buffer: u128) -> Self {
        Self { buffer }
    }
}

impl LendingTargetPolicy for CapBufferTarget {
    fn lending_target(&self, meta: &LendingMetadata) -> u128 {
        meta.lending_cap
            .min(meta.total_borrowed.saturating_add(self.buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_is_borrowed_plus_buffer() {
        let meta = LendingMetadata {
            total_lending: 0,
            total_borrowed: 500,
            lending_cap: u128::MAX,
        };
        assert_eq!(CapBufferTarget::default().lending_target(&meta), 10_500);
    }

    #[test]
    fn test_target_capped() {
        let meta = LendingMetadata {
            total_lending: 0,
            total_borrowed: 500,
            lending_cap: 2_000,
        };
        assert_eq!(CapBufferTarget::new(10_000).lending_target(&meta), 2_000);
    }

    #[test]
    fn test_hourly_share() {
        let meta = LendingMetadata::new();
        let policy = CapBufferTarget::new(10_000);
        assert_eq!(policy.hourly_target(&meta, 4_000).unwrap(), 4_000);
    }
}
