//! In-memory instrument and role registries.

use dashmap::DashSet;
use lendcurve_core::{AccountId, InstrumentId};
use lendcurve_traits::{InstrumentRegistry, Role, RoleRegistry};

/// Set of active instruments.
#[derive(Debug, Default)]
pub struct InMemoryInstrumentRegistry {
    active: DashSet<InstrumentId>,
}

impl InMemoryInstrumentRegistry {
    /// Creates a registry with nothing active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with `instruments` active.
    pub fn with_active<I>(instruments: I) -> Self
    where
        I: IntoIterator<Item = InstrumentId>,
    {
        Self {
            active: instruments.into_iter().collect(),
        }
    }

    /// Accepts new activity for `instrument`.
    pub fn activate(&self, instrument: InstrumentId) {
        self.active.insert(instrument);
    }

    /// Stops new activity for `instrument`. Existing positions stay withdrawable.
    pub fn deactivate(&self, instrument: &InstrumentId) {
        self.active.remove(instrument);
    }
}

impl InstrumentRegistry for InMemoryInstrumentRegistry {
    fn is_active(&self, instrument: &InstrumentId) -> bool {
        self.active.contains(instrument)
    }
}

/// Role assignments.
#[derive(Debug, Default)]
pub struct InMemoryRoles {
    grants: DashSet<(AccountId, Role)>,
}

impl InMemoryRoles {
    /// Creates a registry with no grants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `role` to `account`.
    pub fn grant(&self, account: AccountId, role: Role) {
        self.grants.insert((account, role));
    }

    /// Revokes `role` from `account`.
    pub fn revoke(&self, account: &AccountId, role: Role) {
        self.grants.remove(&(account.clone(), role));
    }
}

impl RoleRegistry for InMemoryRoles {
    fn has_role(&self, account: &AccountId, role: Role) -> bool {
        self.grants.contains(&(account.clone(), role))
    }
}
