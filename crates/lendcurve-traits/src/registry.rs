//! Instrument, role and issuer lookups.

use lendcurve_core::{AccountId, InstrumentId};
use serde::{Deserialize, Serialize};

/// Administrative roles checked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Global tuning: runtime bounds, max hourly yield, drift rate, withdrawal window.
    Owner,
    /// Per-instrument setup: bucket weights and yields, caps, hourly APR.
    TokenActivator,
    /// Margin side allowed to register and repay borrowing.
    Borrower,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Owner => "owner",
            Role::TokenActivator => "token-activator",
            Role::Borrower => "borrower",
        };
        f.write_str(name)
    }
}

/// Which instruments accept new activity.
pub trait InstrumentRegistry: Send + Sync {
    /// Returns true if `instrument` is active.
    fn is_active(&self, instrument: &InstrumentId) -> bool;
}

/// Who holds which administrative role.
pub trait RoleRegistry: Send + Sync {
    /// Returns true if `account` holds `role`.
    fn has_role(&self, account: &AccountId, role: Role) -> bool;
}

/// Maps the issuer a ledger is keyed by to the token custody moves.
///
/// Cross-margin lending issues directly in the token; isolated-margin lending
/// keys ledgers by pair-specific issuers that settle in an underlying token.
pub trait IssuerStrategy: Send + Sync {
    /// Token settled for `issuer`, or `None` if the issuer is unknown.
    fn token_for(&self, issuer: &InstrumentId) -> Option<InstrumentId>;
}
