//! Domain types for the lendcurve engine.

mod ids;
mod lending;
mod time;

pub use ids::{AccountId, BondId, InstrumentId};
pub use lending::LendingMetadata;
pub use time::{whole_hours, Timestamp, DAY, HOUR, HOURS_PER_YEAR};
