//! The bucketed fixed-term yield curve.
//!
//! The runtime axis `[min_runtime, max_runtime]` is split into equal-width
//! buckets. Each bucket carries a share of the instrument's lending target
//! (its runtime weight, out of [`WEIGHT_TOTAL`]), a stored yield and the flow
//! speeds that drive how that yield drifts. Weight not assigned to any bucket
//! belongs to the hourly bond market.

use lendcurve_core::error::CoreResult;
use lendcurve_core::fixed_point::{add, mul_div, sub, FP32};
use lendcurve_core::types::{whole_hours, Timestamp, HOUR};
use serde::{Deserialize, Serialize};

use crate::adjustment::{yield_ceiling_fp, YieldAdjustment};
use crate::bounds::RuntimeBounds;
use crate::error::{CurveError, CurveResult};
use crate::params::{RateParameters, SpeedParams};
use crate::speed::FlowSpeed;

/// Sum of all runtime weights, including the hourly market's remainder.
pub const WEIGHT_TOTAL: u32 = 10_000;

// ============================================================================
// Bucket Metadata
// ============================================================================

/// State of one runtime bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondBucketMetadata {
    /// Share of the lending target, out of [`WEIGHT_TOTAL`].
    pub runtime_weight: u32,
    /// Recent buy volume.
    pub buying: FlowSpeed,
    /// Recent withdraw volume.
    pub withdrawing: FlowSpeed,
    /// When `runtime_yield_fp` was last stored.
    pub yield_last_updated: Timestamp,
    /// Lending committed in this bucket (midpoint of principal and return).
    pub total_lending: u128,
    /// FP32 multiplier paid over a runtime in this bucket.
    pub runtime_yield_fp: u128,
}

impl BondBucketMetadata {
    /// A new bucket whose yield is seeded from its shortest runtime.
    ///
    /// Seed yield is `FP32 + seed_hourly_interest_fp * (lower_edge / HOUR)`.
    pub fn seeded(
        runtime_weight: u32,
        lower_edge: u64,
        seed_hourly_interest_fp: u128,
        now: Timestamp,
    ) -> CoreResult<Self> {
        let hours = u128::from(lower_edge / HOUR);
        let interest = mul_div(seed_hourly_interest_fp, hours, 1)?;
        Ok(Self {
            runtime_weight,
            buying: FlowSpeed::new(now),
            withdrawing: FlowSpeed::new(now),
            yield_last_updated: now,
            total_lending: 0,
            runtime_yield_fp: add(FP32, interest, "seed_yield")?,
        })
    }

    /// This bucket's share of the instrument's lending target.
    pub fn target(&self, lending_target: u128) -> CoreResult<u128> {
        mul_div(
            lending_target,
            u128::from(self.runtime_weight),
            u128::from(WEIGHT_TOTAL),
        )
    }

    /// Books a purchase: lending grows, the quoted yield is stored.
    pub fn record_purchase(
        &mut self,
        committed: u128,
        principal: u128,
        runtime: u64,
        yield_fp: u128,
        now: Timestamp,
        speed: &SpeedParams,
    ) -> CoreResult<()> {
        self.total_lending = add(self.total_lending, committed, "bucket_purchase")?;
        self.runtime_yield_fp = yield_fp;
        self.yield_last_updated = now;
        self.buying.record(principal, runtime, now, speed)
    }

    /// Books a withdrawal of a matured bond.
    pub fn record_withdrawal(
        &mut self,
        committed: u128,
        principal: u128,
        runtime: u64,
        now: Timestamp,
        speed: &SpeedParams,
    ) -> CoreResult<()> {
        self.total_lending = sub(self.total_lending, committed, "bucket_withdrawal")?;
        self.withdrawing.record(principal, runtime, now, speed)
    }
}

// ============================================================================
// Quote Context
// ============================================================================

/// Instrument-wide inputs to a yield quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteContext {
    /// Instrument lending target (before applying bucket weights).
    pub lending_target: u128,
    /// Instrument total borrowed.
    pub total_borrowed: u128,
    /// Instrument total lending.
    pub total_lending: u128,
    /// Hourly multiplier currently charged to borrowers.
    pub borrow_hourly_yield_fp: u128,
    /// Hourly ceiling.
    pub max_hourly_yield_fp: u128,
    /// Yield drift per hour, per hour of runtime.
    pub yield_change_per_hour_fp: u128,
    /// Flow-speed weighting.
    pub speed: SpeedParams,
}

impl QuoteContext {
    /// Builds a context from global parameters and instrument totals.
    pub fn new(
        params: &RateParameters,
        lending_target: u128,
        total_borrowed: u128,
        total_lending: u128,
        borrow_hourly_yield_fp: u128,
    ) -> Self {
        Self {
            lending_target,
            total_borrowed,
            total_lending,
            borrow_hourly_yield_fp,
            max_hourly_yield_fp: params.max_hourly_yield_fp,
            yield_change_per_hour_fp: params.yield_change_per_hour_fp,
            speed: params.speed,
        }
    }

    /// Ceiling for a yield covering `horizon_hours`.
    pub fn ceiling_fp(&self, horizon_hours: u64) -> CoreResult<u128> {
        yield_ceiling_fp(
            self.max_hourly_yield_fp,
            self.borrow_hourly_yield_fp,
            self.total_borrowed,
            self.total_lending,
            horizon_hours,
        )
    }
}

// ============================================================================
// Bucket Curve
// ============================================================================

/// All runtime buckets of one instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCurve {
    buckets: Vec<BondBucketMetadata>,
}

impl BucketCurve {
    /// An empty curve; weights must be set before bonds can be quoted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether runtime weights have been configured.
    pub fn is_initialized(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the curve has no buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// All buckets, shortest runtimes first.
    pub fn buckets(&self) -> &[BondBucketMetadata] {
        &self.buckets
    }

    /// Bucket at `index`.
    pub fn bucket(&self, index: usize) -> CurveResult<&BondBucketMetadata> {
        self.buckets
            .get(index)
            .ok_or(CurveError::BucketIndexOutOfRange {
                index,
                len: self.buckets.len(),
            })
    }

    /// Mutable bucket at `index`.
    pub fn bucket_mut(&mut self, index: usize) -> CurveResult<&mut BondBucketMetadata> {
        let len = self.buckets.len();
        self.buckets
            .get_mut(index)
            .ok_or(CurveError::BucketIndexOutOfRange { index, len })
    }

    /// Sum of bucket weights.
    pub fn total_weight(&self) -> u32 {
        self.buckets.iter().map(|b| b.runtime_weight).sum()
    }

    /// Weight left for the hourly market.
    pub fn hourly_weight(&self) -> u32 {
        WEIGHT_TOTAL.saturating_sub(self.total_weight())
    }

    /// Sum of bucket lending.
    pub fn total_lending(&self) -> CoreResult<u128> {
        self.buckets
            .iter()
            .try_fold(0u128, |acc, b| add(acc, b.total_lending, "curve_total_lending"))
    }

    /// Sets runtime weights.
    ///
    /// The first call creates one bucket per weight, seeding yields from each
    /// bucket's lower runtime edge. Later calls must supply the same count
    /// and only replace weights.
    pub fn set_runtime_weights(
        &mut self,
        weights: &[u32],
        bounds: &RuntimeBounds,
        seed_hourly_interest_fp: u128,
        now: Timestamp,
    ) -> CurveResult<()> {
        if weights.is_empty() {
            return Err(CurveError::invalid_weights("at least one weight is required"));
        }
        let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
        if total > u64::from(WEIGHT_TOTAL) {
            return Err(CurveError::invalid_weights(format!(
                "weights sum to {total}, above {WEIGHT_TOTAL}"
            )));
        }

        if self.buckets.is_empty() {
            let width = bounds.bucket_width(weights.len())?;
            let mut buckets = Vec::with_capacity(weights.len());
            for (i, &weight) in weights.iter().enumerate() {
                let lower_edge = bounds.min_runtime() + width * i as u64;
                buckets.push(BondBucketMetadata::seeded(
                    weight,
                    lower_edge,
                    seed_hourly_interest_fp,
                    now,
                )?);
            }
            self.buckets = buckets;
            return Ok(());
        }

        if weights.len() != self.buckets.len() {
            return Err(CurveError::mismatch(self.buckets.len(), weights.len()));
        }
        for (bucket, &weight) in self.buckets.iter_mut().zip(weights) {
            bucket.runtime_weight = weight;
        }
        Ok(())
    }

    /// Overwrites every bucket's stored yield.
    ///
    /// Each yield must be at least `FP32`. `yield_last_updated` is reset so
    /// the new value is quoted as set until time passes.
    pub fn set_runtime_yields_fp(&mut self, yields: &[u128], now: Timestamp) -> CurveResult<()> {
        if self.buckets.is_empty() {
            return Err(CurveError::BucketsNotInitialized);
        }
        if yields.len() != self.buckets.len() {
            return Err(CurveError::mismatch(self.buckets.len(), yields.len()));
        }
        if let Some((index, &yield_fp)) = yields.iter().enumerate().find(|(_, y)| **y < FP32) {
            return Err(CurveError::InvalidYield { index, yield_fp });
        }
        for (bucket, &yield_fp) in self.buckets.iter_mut().zip(yields) {
            bucket.runtime_yield_fp = yield_fp;
            bucket.yield_last_updated = now;
        }
        Ok(())
    }

    /// Yield a bond of `runtime` in bucket `index` would receive at `now`,
    /// if `added` more lending were committed to the bucket.
    pub fn quote_yield_fp(
        &self,
        index: usize,
        added: u128,
        runtime: u64,
        ctx: &QuoteContext,
        now: Timestamp,
    ) -> CurveResult<u128> {
        let bucket = self.bucket(index)?;
        let horizon_hours = whole_hours(runtime);
        let adjustment = YieldAdjustment {
            yield_fp: bucket.runtime_yield_fp,
            last_updated: bucket.yield_last_updated,
            total_lending: add(bucket.total_lending, added, "quote_yield")?,
            target: bucket.target(ctx.lending_target)?,
            buying_speed: bucket.buying.current(runtime, now, &ctx.speed)?,
            withdrawing_speed: bucket.withdrawing.current(runtime, now, &ctx.speed)?,
            ceiling_fp: ctx.ceiling_fp(horizon_hours)?,
            horizon_hours,
        };
        Ok(adjustment.updated_yield_fp(now, ctx.yield_change_per_hour_fp)?)
    }
}
