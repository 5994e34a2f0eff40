//! Runtime bounds and bucket indexing.

use lendcurve_core::types::{Timestamp, DAY, HOUR};
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// Inclusive range of accepted bond runtimes, in seconds.
///
/// Invariant: `HOUR < min_runtime < max_runtime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeBounds {
    min_runtime: u64,
    max_runtime: u64,
}

impl Default for RuntimeBounds {
    fn default() -> Self {
        Self {
            min_runtime: 30 * DAY,
            max_runtime: 365 * DAY,
        }
    }
}

impl RuntimeBounds {
    /// Creates validated bounds.
    pub fn new(min_runtime: u64, max_runtime: u64) -> CurveResult<Self> {
        if min_runtime <= HOUR {
            return Err(CurveError::invalid_bounds(format!(
                "minimum runtime {min_runtime}s must exceed one hour"
            )));
        }
        if max_runtime <= min_runtime {
            return Err(CurveError::invalid_bounds(format!(
                "maximum runtime {max_runtime}s must exceed minimum {min_runtime}s"
            )));
        }
        Ok(Self {
            min_runtime,
            max_runtime,
        })
    }

    /// Bounds with a new minimum.
    pub fn with_min_runtime(&self, min_runtime: u64) -> CurveResult<Self> {
        Self::new(min_runtime, self.max_runtime)
    }

    /// Bounds with a new maximum.
    pub fn with_max_runtime(&self, max_runtime: u64) -> CurveResult<Self> {
        Self::new(self.min_runtime, max_runtime)
    }

    /// Shortest accepted runtime.
    pub fn min_runtime(&self) -> u64 {
        self.min_runtime
    }

    /// Longest accepted runtime.
    pub fn max_runtime(&self) -> u64 {
        self.max_runtime
    }

    /// `max_runtime - min_runtime`.
    pub fn span(&self) -> u64 {
        self.max_runtime - self.min_runtime
    }

    /// Whether `runtime` is within the bounds (inclusive).
    pub fn contains(&self, runtime: u64) -> bool {
        (self.min_runtime..=self.max_runtime).contains(&runtime)
    }

    /// Fails unless `runtime` is within the bounds.
    pub fn check(&self, runtime: u64) -> CurveResult<()> {
        if self.contains(runtime) {
            Ok(())
        } else {
            Err(CurveError::runtime_out_of_range(
                runtime,
                self.min_runtime,
                self.max_runtime,
            ))
        }
    }

    /// Width of each of `buckets` equal runtime buckets.
    pub fn bucket_width(&self, buckets: usize) -> CurveResult<u64> {
        if buckets == 0 {
            return Err(CurveError::BucketsNotInitialized);
        }
        let width = self.span() / buckets as u64;
        if width == 0 {
            return Err(CurveError::ZeroBucketWidth {
                span: self.span(),
                buckets,
            });
        }
        Ok(width)
    }

    /// Bucket holding `runtime`.
    ///
    /// The division remainder is absorbed by the last bucket, so
    /// `max_runtime` maps to `buckets - 1`.
    pub fn bucket_index(&self, runtime: u64, buckets: usize) -> CurveResult<usize> {
        self.check(runtime)?;
        let width = self.bucket_width(buckets)?;
        let index = ((runtime - self.min_runtime) / width) as usize;
        Ok(index.min(buckets - 1))
    }

    /// Shortest runtime that lands in bucket `index`.
    pub fn bucket_lower_edge(&self, index: usize, buckets: usize) -> CurveResult<u64> {
        if index >= buckets {
            return Err(CurveError::BucketIndexOutOfRange {
                index,
                len: buckets,
            });
        }
        Ok(self.min_runtime + self.bucket_width(buckets)? * index as u64)
    }

    /// Maturity of a bond issued at `now` for `runtime` seconds.
    pub fn maturity(now: Timestamp, runtime: u64) -> Timestamp {
        now.saturating_add(runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> RuntimeBounds {
        RuntimeBounds::new(30 * DAY, 365 * DAY).unwrap()
    }

    #[test]
    fn test_rejects_short_minimum() {
        assert!(RuntimeBounds::new(HOUR, DAY).is_err());
        assert!(RuntimeBounds::new(HOUR + 1, DAY).is_ok());
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        assert!(RuntimeBounds::new(DAY, DAY).is_err());
        assert!(bounds().with_max_runtime(10 * DAY).is_err());
        assert!(bounds().with_min_runtime(400 * DAY).is_err());
    }

    #[test]
    fn test_bucket_index_edges() {
        let b = bounds();
        assert_eq!(b.bucket_index(30 * DAY, 3).unwrap(), 0);
        assert_eq!(b.bucket_index(365 * DAY, 3).unwrap(), 2);
        // width is 335 days / 3
        let width = 335 * DAY / 3;
        assert_eq!(b.bucket_index(30 * DAY + width - 1, 3).unwrap(), 0);
        assert_eq!(b.bucket_index(30 * DAY + width, 3).unwrap(), 1);
    }

    #[test]
    fn test_bucket_index_out_of_range() {
        let b = bounds();
        assert!(matches!(
            b.bucket_index(29 * DAY, 3),
            Err(CurveError::RuntimeOutOfRange { .. })
        ));
        assert!(matches!(
            b.bucket_index(366 * DAY, 3),
            Err(CurveError::RuntimeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_width() {
        let b = RuntimeBounds::new(HOUR + 1, HOUR + 3).unwrap();
        assert!(matches!(
            b.bucket_width(5),
            Err(CurveError::ZeroBucketWidth { span: 2, buckets: 5 })
        ));
        assert!(matches!(
            b.bucket_width(0),
            Err(CurveError::BucketsNotInitialized)
        ));
    }

    #[test]
    fn test_lower_edge() {
        let b = bounds();
        assert_eq!(b.bucket_lower_edge(0, 2).unwrap(), 30 * DAY);
        assert_eq!(b.bucket_lower_edge(1, 2).unwrap(), 30 * DAY + 335 * DAY / 2);
        assert!(b.bucket_lower_edge(2, 2).is_err());
    }
}
