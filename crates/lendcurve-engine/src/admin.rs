//! Administration: bucket setup, runtime bounds, caps and rate tuning.
//!
//! Per-instrument settings need [`Role::TokenActivator`]; global settings
//! need [`Role::Owner`]. Lock order is runtime bounds first, then ledgers.

use lendcurve_core::fixed_point::FP32;
use lendcurve_core::types::HOUR;
use lendcurve_core::{AccountId, InstrumentId};
use lendcurve_rates::{CurveError, RuntimeBounds};
use lendcurve_traits::{LendingEvent, Role};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::LendingEngine;

impl LendingEngine {
    // =========================================================================
    // BUCKET CURVE
    // =========================================================================

    /// Sets bucket weights for `issuer`.
    ///
    /// The first call creates the curve with one bucket per weight, seeded
    /// from each bucket's lower runtime edge. Later calls must keep the
    /// bucket count.
    pub fn set_runtime_weights(
        &self,
        caller: &AccountId,
        issuer: &InstrumentId,
        weights: &[u32],
    ) -> EngineResult<()> {
        self.authorize(caller, Role::TokenActivator)?;
        let params = self.rate_parameters();
        let now = self.now();

        let bounds = self.bounds.read();
        self.with_ledger(issuer, &params, now, |ledger| {
            let mut curve = ledger.curve.clone();
            curve.set_runtime_weights(weights, &bounds, params.seed_hourly_interest_fp, now)?;
            ledger.curve = curve;
            Ok(())
        })?;
        drop(bounds);

        info!(instrument = %issuer, weights = ?weights, "runtime weights set");
        self.publish(LendingEvent::RuntimeWeightsSet {
            instrument: issuer.clone(),
            weights: weights.to_vec(),
        });
        Ok(())
    }

    /// Overwrites every bucket yield of `issuer`.
    pub fn set_runtime_yields_fp(
        &self,
        caller: &AccountId,
        issuer: &InstrumentId,
        yields_fp: &[u128],
    ) -> EngineResult<()> {
        self.authorize(caller, Role::TokenActivator)?;
        let now = self.now();
        let handle = self
            .existing_ledger(issuer)
            .map_err(|_| CurveError::BucketsNotInitialized)?;
        let mut ledger = handle.lock();
        let mut curve = ledger.curve.clone();
        curve.set_runtime_yields_fp(yields_fp, now)?;
        ledger.curve = curve;
        drop(ledger);

        info!(instrument = %issuer, yields_fp = ?yields_fp, "runtime yields set");
        self.publish(LendingEvent::RuntimeYieldsSet {
            instrument: issuer.clone(),
            yields_fp: yields_fp.to_vec(),
        });
        Ok(())
    }

    // =========================================================================
    // RUNTIME BOUNDS
    // =========================================================================

    /// Sets the shortest accepted runtime.
    pub fn set_min_runtime(&self, caller: &AccountId, min_runtime: u64) -> EngineResult<()> {
        self.authorize(caller, Role::Owner)?;
        self.update_bounds(|bounds| bounds.with_min_runtime(min_runtime))
    }

    /// Sets the longest accepted runtime.
    pub fn set_max_runtime(&self, caller: &AccountId, max_runtime: u64) -> EngineResult<()> {
        self.authorize(caller, Role::Owner)?;
        self.update_bounds(|bounds| bounds.with_max_runtime(max_runtime))
    }

    fn update_bounds(
        &self,
        change: impl FnOnce(&RuntimeBounds) -> Result<RuntimeBounds, CurveError>,
    ) -> EngineResult<()> {
        let mut bounds = self.bounds.write();
        let updated = change(&*bounds)?;
        for handle in self.all_ledgers() {
            let ledger = handle.lock();
            if ledger.curve.is_initialized() {
                updated.bucket_width(ledger.curve.len())?;
            }
        }
        *bounds = updated;
        drop(bounds);

        info!(
            min_runtime = updated.min_runtime(),
            max_runtime = updated.max_runtime(),
            "runtime bounds set"
        );
        self.publish(LendingEvent::RuntimeBoundsSet {
            min_runtime: updated.min_runtime(),
            max_runtime: updated.max_runtime(),
        });
        Ok(())
    }

    // =========================================================================
    // CAPS AND RATES
    // =========================================================================

    /// Caps total lending of `issuer`. Existing positions are unaffected.
    pub fn set_lending_cap(
        &self,
        caller: &AccountId,
        issuer: &InstrumentId,
        cap: u128,
    ) -> EngineResult<()> {
        self.authorize(caller, Role::TokenActivator)?;
        let params = self.rate_parameters();
        self.with_ledger(issuer, &params, self.now(), |ledger| {
            ledger.meta.lending_cap = cap;
            Ok(())
        })?;

        info!(instrument = %issuer, cap = %cap, "lending cap set");
        self.publish(LendingEvent::LendingCapSet {
            instrument: issuer.clone(),
            cap,
        });
        Ok(())
    }

    /// Sets the ceiling on hourly multipliers.
    pub fn set_max_hourly_yield_fp(&self, caller: &AccountId, value: u128) -> EngineResult<()> {
        self.authorize(caller, Role::Owner)?;
        if value < FP32 {
            return Err(EngineError::invalid_config(format!(
                "max hourly yield {value} is below FP32"
            )));
        }
        self.params.write().max_hourly_yield_fp = value;
        self.rate_parameter_set("max_hourly_yield_fp", value);
        Ok(())
    }

    /// Sets how far quoted yields drift per hour.
    pub fn set_yield_change_per_hour_fp(&self, caller: &AccountId, value: u128) -> EngineResult<()> {
        self.authorize(caller, Role::Owner)?;
        self.params.write().yield_change_per_hour_fp = value;
        self.rate_parameter_set("yield_change_per_hour_fp", value);
        Ok(())
    }

    /// Sets the hourly-bond withdrawal window in seconds.
    pub fn set_withdrawal_window(&self, caller: &AccountId, seconds: u64) -> EngineResult<()> {
        self.authorize(caller, Role::Owner)?;
        if seconds > HOUR {
            return Err(EngineError::invalid_config(format!(
                "withdrawal window of {seconds}s exceeds one hour"
            )));
        }
        self.params.write().withdrawal_window = seconds;
        self.rate_parameter_set("withdrawal_window", u128::from(seconds));
        Ok(())
    }

    fn rate_parameter_set(&self, parameter: &str, value: u128) {
        info!(parameter, value = %value, "rate parameter set");
        self.publish(LendingEvent::RateParameterSet {
            parameter: parameter.to_string(),
            value,
        });
    }
}
