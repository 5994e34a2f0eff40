//! # lendcurve Engine
//!
//! The lending engine: fixed-term bonds priced off a self-adjusting bucket
//! curve, an hourly bond market that also absorbs unpayable fixed-term
//! claims, and the borrow-side accounting that both depend on.
//!
//! This crate provides:
//! - [`LendingEngine`]: The façade exposing every lending operation
//! - [`LendingEngineBuilder`]: Wires configuration and collaborators
//! - [`Bond`], [`BondQuote`], [`BondSettlement`]: Fixed-term bond records
//! - [`HourlyMarket`], [`HourlyBond`]: Hourly bond state
//! - In-memory collaborators: [`InMemoryFund`], [`InMemoryInstrumentRegistry`],
//!   [`InMemoryRoles`], [`EventLog`], [`BroadcastPublisher`]
//!
//! ## Architecture
//!
//! ```text
//! caller ─┬─> issue_bond / withdraw_bond ─┐
//!         ├─> hourly bond operations ─────┼─> InstrumentLedger (per-instrument mutex)
//!         ├─> borrow accounting ──────────┤     ├─ LendingMetadata
//!         └─> administration ─────────────┘     ├─ BucketCurve
//!                                               ├─ HourlyMarket + accounts
//!                                               └─ borrow YieldAccumulator
//!                         │
//!                         └─> Fund (custody), EventPublisher
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let engine = LendingEngineBuilder::new()
//!     .with_config(config)
//!     .with_fund(fund)
//!     .with_instruments(registry)
//!     .with_roles(roles)
//!     .build()?;
//!
//! engine.set_runtime_weights(&activator, &dai, &[5_000, 5_000])?;
//! let bond = engine.issue_bond(&alice, &dai, 30 * DAY, 1_000, 1_050)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod admin;
pub mod bonds;
pub mod borrow;
pub mod builder;
pub mod custody;
pub mod error;
pub mod events;
pub mod hourly;
pub mod issuers;
pub mod ledger;
pub mod registry;

// Re-exports
pub use bonds::{Bond, BondQuote, BondSettlement};
pub use borrow::BorrowInterest;
pub use builder::LendingEngineBuilder;
pub use custody::InMemoryFund;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use events::{BroadcastPublisher, EventLog, TracingPublisher};
pub use issuers::{CrossMarginIssuers, IsolatedMarginIssuers};
pub use ledger::{HourlyBond, HourlyMarket};
pub use registry::{InMemoryInstrumentRegistry, InMemoryRoles};

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use lendcurve_core::{AccountId, BondId, InstrumentId, LendingMetadata, Timestamp};
use lendcurve_rates::{
    BondBucketMetadata, LendingTargetPolicy, RateParameters, RuntimeBounds, YieldAccumulator,
};
use lendcurve_traits::{
    Clock, EventPublisher, Fund, InstrumentRegistry, IssuerStrategy, LendingEvent, Role,
    RoleRegistry,
};

use crate::ledger::InstrumentLedger;

/// The lending engine.
pub struct LendingEngine {
    /// Deployment name
    name: String,

    /// Global rate parameters
    params: RwLock<RateParameters>,

    /// Accepted fixed-term runtimes
    bounds: RwLock<RuntimeBounds>,

    /// One ledger per issuer
    ledgers: DashMap<InstrumentId, Arc<Mutex<InstrumentLedger>>>,

    /// Outstanding fixed-term bonds
    bonds: DashMap<BondId, Bond>,

    /// Next bond identifier, shared across instruments
    next_bond_id: AtomicU64,

    fund: Arc<dyn Fund>,
    instruments: Arc<dyn InstrumentRegistry>,
    roles: Arc<dyn RoleRegistry>,
    issuers: Arc<dyn IssuerStrategy>,
    target_policy: Arc<dyn LendingTargetPolicy>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventPublisher>,
}

impl LendingEngine {
    /// Engine name from configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current time according to the engine's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Current runtime bounds.
    pub fn runtime_bounds(&self) -> RuntimeBounds {
        *self.bounds.read()
    }

    /// Current rate parameters.
    pub fn rate_parameters(&self) -> RateParameters {
        *self.params.read()
    }

    // =========================================================================
    // READ MODELS
    // =========================================================================

    /// Lending totals of an instrument.
    pub fn lending_metadata(&self, instrument: &InstrumentId) -> EngineResult<LendingMetadata> {
        Ok(self.existing_ledger(instrument)?.lock().meta)
    }

    /// Bucket state of an instrument, shortest runtimes first.
    pub fn bucket_metadata(
        &self,
        instrument: &InstrumentId,
    ) -> EngineResult<Vec<BondBucketMetadata>> {
        Ok(self
            .existing_ledger(instrument)?
            .lock()
            .curve
            .buckets()
            .to_vec())
    }

    /// Hourly market state as of now.
    pub fn hourly_market(&self, instrument: &InstrumentId) -> EngineResult<HourlyMarket> {
        let params = self.rate_parameters();
        let handle = self.existing_ledger(instrument)?;
        let ledger = handle.lock();
        Ok(ledger.refreshed_hourly(&params, self.target_policy.as_ref(), self.now())?)
    }

    /// Current hourly bond multiplier.
    pub fn hourly_yield_fp(&self, instrument: &InstrumentId) -> EngineResult<u128> {
        Ok(self.hourly_market(instrument)?.hourly_yield_fp())
    }

    /// Borrow accumulator as of now.
    pub fn borrow_accumulator(&self, instrument: &InstrumentId) -> EngineResult<YieldAccumulator> {
        let params = self.rate_parameters();
        let handle = self.existing_ledger(instrument)?;
        let ledger = handle.lock();
        Ok(ledger.refreshed_borrow(&params, self.now())?)
    }

    /// Lending the instrument is aiming for.
    pub fn lending_target(&self, instrument: &InstrumentId) -> EngineResult<u128> {
        let meta = self.lending_metadata(instrument)?;
        Ok(self.target_policy.lending_target(&meta))
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn authorize(&self, account: &AccountId, role: Role) -> EngineResult<()> {
        if self.roles.has_role(account, role) {
            Ok(())
        } else {
            Err(EngineError::Unauthorized {
                account: account.clone(),
                role,
            })
        }
    }

    fn ensure_active(&self, instrument: &InstrumentId) -> EngineResult<()> {
        if self.instruments.is_active(instrument) {
            Ok(())
        } else {
            Err(EngineError::InactiveInstrument {
                instrument: instrument.clone(),
            })
        }
    }

    fn token_for(&self, issuer: &InstrumentId) -> EngineResult<InstrumentId> {
        self.issuers
            .token_for(issuer)
            .ok_or_else(|| EngineError::UnknownIssuer {
                issuer: issuer.clone(),
            })
    }

    /// Runs `op` against the ledger of `instrument`, creating it on first use.
    ///
    /// A ledger created by a call whose `op` fails is removed again unless
    /// another caller has picked it up meanwhile.
    fn with_ledger<T>(
        &self,
        instrument: &InstrumentId,
        params: &RateParameters,
        now: Timestamp,
        op: impl FnOnce(&mut InstrumentLedger) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let fresh = Arc::new(Mutex::new(InstrumentLedger::new(params, now)));
        let mut guard = fresh.lock();
        let existing = match self.ledgers.entry(instrument.clone()) {
            Entry::Occupied(entry) => Some(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&fresh));
                None
            }
        };

        let Some(handle) = existing else {
            let result = op(&mut *guard);
            drop(guard);
            if result.is_err() {
                self.ledgers.remove_if(instrument, |_, held| {
                    Arc::ptr_eq(held, &fresh) && Arc::strong_count(held) == 2
                });
            }
            return result;
        };
        drop(guard);
        let mut ledger = handle.lock();
        op(&mut *ledger)
    }

    fn existing_ledger(&self, instrument: &InstrumentId) -> EngineResult<Arc<Mutex<InstrumentLedger>>> {
        self.ledgers
            .get(instrument)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::UnknownInstrument {
                instrument: instrument.clone(),
            })
    }

    /// Snapshot of every ledger handle; never lock a ledger while iterating the map.
    fn all_ledgers(&self) -> Vec<Arc<Mutex<InstrumentLedger>>> {
        self.ledgers.iter().map(|entry| entry.value().clone()).collect()
    }

    fn publish(&self, event: LendingEvent) {
        self.events.publish(event);
    }
}
