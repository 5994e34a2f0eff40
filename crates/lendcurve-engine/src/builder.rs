//! Builder for the lending engine.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use dashmap::DashMap;
use lendcurve_config::{EngineConfig, Validate};
use lendcurve_rates::{CapBufferTarget, LendingTargetPolicy};
use lendcurve_traits::{
    Clock, EventPublisher, Fund, InstrumentRegistry, IssuerStrategy, RoleRegistry, SystemClock,
};
use parking_lot::RwLock;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::events::TracingPublisher;
use crate::issuers::CrossMarginIssuers;
use crate::LendingEngine;

/// Builder for constructing a [`LendingEngine`].
///
/// Custody, the instrument registry and the role registry are required.
/// The clock defaults to [`SystemClock`], events go to [`TracingPublisher`],
/// issuers are cross-margin and the lending target is
/// [`CapBufferTarget`] with the configured buffer.
pub struct LendingEngineBuilder {
    config: Option<EngineConfig>,
    fund: Option<Arc<dyn Fund>>,
    instruments: Option<Arc<dyn InstrumentRegistry>>,
    roles: Option<Arc<dyn RoleRegistry>>,
    issuers: Option<Arc<dyn IssuerStrategy>>,
    target_policy: Option<Arc<dyn LendingTargetPolicy>>,
    clock: Option<Arc<dyn Clock>>,
    events: Option<Arc<dyn EventPublisher>>,
}

impl LendingEngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            fund: None,
            instruments: None,
            roles: None,
            issuers: None,
            target_policy: None,
            clock: None,
            events: None,
        }
    }

    /// Set the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set token custody.
    pub fn with_fund(mut self, fund: Arc<dyn Fund>) -> Self {
        self.fund = Some(fund);
        self
    }

    /// Set the instrument registry.
    pub fn with_instruments(mut self, instruments: Arc<dyn InstrumentRegistry>) -> Self {
        self.instruments = Some(instruments);
        self
    }

    /// Set the role registry.
    pub fn with_roles(mut self, roles: Arc<dyn RoleRegistry>) -> Self {
        self.roles = Some(roles);
        self
    }

    /// Set the issuer strategy.
    pub fn with_issuers(mut self, issuers: Arc<dyn IssuerStrategy>) -> Self {
        self.issuers = Some(issuers);
        self
    }

    /// Set the lending target policy.
    pub fn with_target_policy(mut self, policy: Arc<dyn LendingTargetPolicy>) -> Self {
        self.target_policy = Some(policy);
        self
    }

    /// Set the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the event publisher.
    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the lending engine.
    pub fn build(self) -> EngineResult<LendingEngine> {
        let config = self.config.unwrap_or_default();
        config.validate_or_error()?;
        let params = config.rate_parameters()?;
        let bounds = config.runtime_bounds()?;

        let fund = self
            .fund
            .ok_or_else(|| EngineError::invalid_config("fund not configured"))?;

        let instruments = self
            .instruments
            .ok_or_else(|| EngineError::invalid_config("instrument registry not configured"))?;

        let roles = self
            .roles
            .ok_or_else(|| EngineError::invalid_config("role registry not configured"))?;

        let lending_buffer = config.lending_buffer;
        let target_policy = self
            .target_policy
            .unwrap_or_else(|| Arc::new(CapBufferTarget::new(lending_buffer)));

        info!(
            name = %config.name,
            min_runtime = bounds.min_runtime(),
            max_runtime = bounds.max_runtime(),
            "lending engine built"
        );

        Ok(LendingEngine {
            name: config.name,
            params: RwLock::new(params),
            bounds: RwLock::new(bounds),
            ledgers: DashMap::new(),
            bonds: DashMap::new(),
            next_bond_id: AtomicU64::new(1),
            fund,
            instruments,
            roles,
            issuers: self.issuers.unwrap_or_else(|| Arc::new(CrossMarginIssuers)),
            target_policy,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            events: self.events.unwrap_or_else(|| Arc::new(TracingPublisher)),
        })
    }
}

impl Default for LendingEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use lendcurve_rates::RuntimeBounds;
    use crate::{InMemoryFund, InMemoryInstrumentRegistry, InMemoryRoles};

    #[test]
    fn test_missing_fund_is_rejected() {
        let err = LendingEngineBuilder::new()
            .with_instruments(Arc::new(InMemoryInstrumentRegistry::new()))
            .with_roles(Arc::new(InMemoryRoles::new()))
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(err.to_string().contains("fund"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = LendingEngineBuilder::new()
            .with_config(EngineConfig::default().with_runtime_bounds(100, 10))
            .with_fund(Arc::new(InMemoryFund::new()))
            .with_instruments(Arc::new(InMemoryInstrumentRegistry::new()))
            .with_roles(Arc::new(InMemoryRoles::new()))
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn test_defaults() {
        let engine = LendingEngineBuilder::new()
            .with_config(EngineConfig::new("test"))
            .with_fund(Arc::new(InMemoryFund::new()))
            .with_instruments(Arc::new(InMemoryInstrumentRegistry::new()))
            .with_roles(Arc::new(InMemoryRoles::new()))
            .build()
            .unwrap();
        assert_eq!(engine.name(), "test");
        assert_eq!(engine.runtime_bounds(), RuntimeBounds::default());
        assert_eq!(engine.rate_parameters().seed_hourly_interest_fp, 539_322);
    }
}
