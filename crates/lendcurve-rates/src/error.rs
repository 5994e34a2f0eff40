//! Error types for rate and curve operations.
//!
//! Covers runtime-bounds validation, bucket configuration and the fixed-point
//! failures bubbled up from `lendcurve-core`.

use lendcurve_core::CoreError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Requested runtime lies outside the configured bounds.
    #[error("Runtime {runtime}s out of range [{min}s, {max}s]")]
    RuntimeOutOfRange {
        /// The requested runtime in seconds.
        runtime: u64,
        /// Minimum valid runtime.
        min: u64,
        /// Maximum valid runtime.
        max: u64,
    },

    /// Minimum/maximum runtime pair is unusable.
    #[error("Invalid runtime bounds: {reason}")]
    InvalidRuntimeBounds {
        /// Description of what's invalid.
        reason: String,
    },

    /// The runtime span is too narrow for the number of buckets.
    #[error("Bucket width is zero: span {span}s across {buckets} buckets")]
    ZeroBucketWidth {
        /// `max_runtime - min_runtime` in seconds.
        span: u64,
        /// Number of buckets.
        buckets: usize,
    },

    /// No runtime weights have been configured yet.
    #[error("Bond buckets are not initialized")]
    BucketsNotInitialized,

    /// Bucket index beyond the end of the curve.
    #[error("Bucket index {index} out of range (curve has {len} buckets)")]
    BucketIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of buckets on the curve.
        len: usize,
    },

    /// An update supplied the wrong number of entries.
    #[error("Configuration mismatch: expected {expected} entries, got {actual}")]
    ConfigurationMismatch {
        /// Number of buckets already on the curve.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },

    /// Runtime weights are empty or sum above the weight total.
    #[error("Invalid runtime weights: {reason}")]
    InvalidWeights {
        /// Description of what's invalid.
        reason: String,
    },

    /// A yield below the no-interest floor.
    #[error("Invalid yield {yield_fp} at bucket {index}: below 1.0")]
    InvalidYield {
        /// Bucket index.
        index: usize,
        /// Offending FP32 multiplier.
        yield_fp: u128,
    },

    /// Fixed-point arithmetic failed.
    #[error(transparent)]
    Arithmetic(#[from] CoreError),
}

impl CurveError {
    /// Creates a runtime out of range error.
    #[must_use]
    pub fn runtime_out_of_range(runtime: u64, min: u64, max: u64) -> Self {
        Self::RuntimeOutOfRange { runtime, min, max }
    }

    /// Creates an invalid runtime bounds error.
    #[must_use]
    pub fn invalid_bounds(reason: impl Into<String>) -> Self {
        Self::InvalidRuntimeBounds {
            reason: reason.into(),
        }
    }

    /// Creates a configuration mismatch error.
    #[must_use]
    pub fn mismatch(expected: usize, actual: usize) -> Self {
        Self::ConfigurationMismatch { expected, actual }
    }

    /// Creates an invalid weights error.
    #[must_use]
    pub fn invalid_weights(reason: impl Into<String>) -> Self {
        Self::InvalidWeights {
            reason: reason.into(),
        }
    }
}
