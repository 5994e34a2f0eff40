//! # lendcurve Rates
//!
//! Interest-rate primitives and the bucketed fixed-term yield curve.
//!
//! This crate provides:
//!
//! - **Accumulators**: [`YieldAccumulator`] compounds an hourly multiplier over
//!   elapsed time (borrow side and hourly bonds)
//! - **Flow Speed**: [`FlowSpeed`] is a time-decayed measure of recent buy or
//!   withdraw volume, the demand/supply signal of the market
//! - **Yield Adjustment**: [`YieldAdjustment`] nudges a quoted yield toward
//!   target occupancy, bounded by [`yield_ceiling_fp`]
//! - **Bucket Curve**: [`BucketCurve`] partitions the runtime axis into
//!   equal-width buckets, each with its own weight, yield and flow state
//! - **Lending Target**: [`LendingTargetPolicy`] decides the desired total
//!   lending level of an instrument
//!
//! ## Quick Start
//!
//! ```rust
//! use lendcurve_core::prelude::{DAY, FP32};
//! use lendcurve_rates::prelude::*;
//!
//! let bounds = RuntimeBounds::new(30 * DAY, 365 * DAY).unwrap();
//! let params = RateParameters::default();
//!
//! let mut curve = BucketCurve::new();
//! curve
//!     .set_runtime_weights(&[5_000, 5_000], &bounds, params.seed_hourly_interest_fp, 0)
//!     .unwrap();
//!
//! assert_eq!(bounds.bucket_index(30 * DAY, curve.len()).unwrap(), 0);
//! assert!(curve.bucket(0).unwrap().runtime_yield_fp > FP32);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]

pub mod accumulator;
pub mod adjustment;
pub mod bounds;
pub mod buckets;
pub mod error;
pub mod params;
pub mod speed;
pub mod target;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::accumulator::YieldAccumulator;
    pub use crate::adjustment::{yield_ceiling_fp, YieldAdjustment, YieldDirection};
    pub use crate::bounds::RuntimeBounds;
    pub use crate::buckets::{BondBucketMetadata, BucketCurve, QuoteContext, WEIGHT_TOTAL};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::params::{RateParameters, SpeedParams};
    pub use crate::speed::FlowSpeed;
    pub use crate::target::{CapBufferTarget, LendingTargetPolicy};
}

pub use accumulator::YieldAccumulator;
pub use adjustment::{yield_ceiling_fp, YieldAdjustment, YieldDirection};
pub use bounds::RuntimeBounds;
pub use buckets::{BondBucketMetadata, BucketCurve, QuoteContext, WEIGHT_TOTAL};
pub use error::{CurveError, CurveResult};
pub use params::{RateParameters, SpeedParams};
pub use speed::FlowSpeed;
pub use target::{CapBufferTarget, LendingTargetPolicy};
