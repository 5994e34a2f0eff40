//! Time units.
//!
//! The engine has no scheduler: every time-dependent quantity is recomputed
//! from `now - last_updated` in whole seconds.

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// One hour in seconds.
pub const HOUR: u64 = 3_600;

/// One day in seconds.
pub const DAY: u64 = 24 * HOUR;

/// Hours in a 365-day year.
pub const HOURS_PER_YEAR: u64 = 365 * 24;

/// Number of whole hours in `seconds`, never less than one.
///
/// Used to scale per-hour quantities to a runtime; sub-hour runtimes count as
/// a single hour so that scaling never collapses to zero.
#[inline]
pub fn whole_hours(seconds: u64) -> u64 {
    (seconds / HOUR).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_hours() {
        assert_eq!(whole_hours(0), 1);
        assert_eq!(whole_hours(HOUR - 1), 1);
        assert_eq!(whole_hours(30 * DAY), 720);
    }
}
