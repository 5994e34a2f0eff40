//! # lendcurve Core
//!
//! Core types and arithmetic for the lendcurve interest-rate engine.
//!
//! This crate provides the foundational building blocks used throughout lendcurve:
//!
//! - **Types**: Identifiers (`InstrumentId`, `AccountId`, `BondId`), timestamps,
//!   and the per-instrument `LendingMetadata` aggregate
//! - **Fixed Point**: FP32 multipliers, overflow-checked `mul_div`, and the
//!   `apply_interest` compounding formula
//!
//! ## Design Philosophy
//!
//! - **Exactness**: All rates are unsigned integers scaled by `FP32`; no floats
//!   touch balances
//! - **Explicit Failure**: Overflow and underflow are errors, never wrap-arounds
//!
//! ## Example
//!
//! ```rust
//! use lendcurve_core::prelude::*;
//!
//! // A multiplier of 1.5 applied to 1000 units.
//! let grown = apply_interest(1_000, FP32 * 3 / 2, FP32).unwrap();
//! assert_eq!(grown, 1_500);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]

pub mod error;
pub mod fixed_point;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::fixed_point::{apply_interest, mul_div, FP32};
    pub use crate::types::{
        AccountId, BondId, InstrumentId, LendingMetadata, Timestamp, DAY, HOUR, HOURS_PER_YEAR,
    };
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use fixed_point::FP32;
pub use types::{AccountId, BondId, InstrumentId, LendingMetadata, Timestamp};
