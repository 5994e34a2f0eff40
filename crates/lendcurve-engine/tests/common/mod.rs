//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use lendcurve_config::EngineConfig;
use lendcurve_core::types::DAY;
use lendcurve_core::{AccountId, InstrumentId};
use lendcurve_engine::{
    EventLog, InMemoryFund, InMemoryInstrumentRegistry, InMemoryRoles, LendingEngine,
    LendingEngineBuilder,
};
use lendcurve_traits::{ManualClock, Role};
use tracing_subscriber::EnvFilter;

/// 2023-11-14, an hour boundary.
pub const START: u64 = 1_699_999_200;

pub const THIRTY_DAYS: u64 = 30 * DAY;

/// Routes engine logs to the test writer; `RUST_LOG=debug` shows quotes.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Everything a test needs to drive the engine.
pub struct Harness {
    pub engine: LendingEngine,
    pub clock: Arc<ManualClock>,
    pub fund: Arc<InMemoryFund>,
    pub events: Arc<EventLog>,
    pub instruments: Arc<InMemoryInstrumentRegistry>,
    pub roles: Arc<InMemoryRoles>,
    pub dai: InstrumentId,
    pub owner: AccountId,
    pub activator: AccountId,
    pub borrower: AccountId,
    pub alice: AccountId,
    pub bob: AccountId,
}

impl Harness {
    /// Default configuration, DAI active, two equally weighted buckets over
    /// 30 to 365 days, alice and bob funded with 1,000,000 DAI each.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::new("test"))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        init_tracing();
        let clock = Arc::new(ManualClock::new(START));
        let fund = Arc::new(InMemoryFund::new());
        let events = Arc::new(EventLog::new());
        let dai = InstrumentId::new("DAI");
        let instruments = Arc::new(InMemoryInstrumentRegistry::with_active([dai.clone()]));

        let owner = AccountId::new("owner");
        let activator = AccountId::new("activator");
        let borrower = AccountId::new("margin");
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");

        let roles = Arc::new(InMemoryRoles::new());
        roles.grant(owner.clone(), Role::Owner);
        roles.grant(activator.clone(), Role::TokenActivator);
        roles.grant(borrower.clone(), Role::Borrower);

        fund.fund_wallet(&alice, &dai, 1_000_000);
        fund.fund_wallet(&bob, &dai, 1_000_000);

        let engine = LendingEngineBuilder::new()
            .with_config(config)
            .with_fund(fund.clone())
            .with_instruments(instruments.clone())
            .with_roles(roles.clone())
            .with_clock(clock.clone())
            .with_events(events.clone())
            .build()
            .expect("engine builds");

        engine
            .set_runtime_weights(&activator, &dai, &[5_000, 5_000])
            .expect("weights accepted");

        Self {
            engine,
            clock,
            fund,
            events,
            instruments,
            roles,
            dai,
            owner,
            activator,
            borrower,
            alice,
            bob,
        }
    }

    pub fn advance(&self, seconds: u64) -> u64 {
        self.clock.advance(seconds)
    }

    /// Alice buys a 30-day bond of 1,000 with no slippage limit.
    pub fn issue_reference_bond(&self) -> lendcurve_core::BondId {
        self.engine
            .issue_bond(&self.alice, &self.dai, THIRTY_DAYS, 1_000, 0)
            .expect("bond issued")
            .expect("no slippage")
    }
}
