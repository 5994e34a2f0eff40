//! Token custody.

use lendcurve_core::{AccountId, InstrumentId};

use crate::error::TraitResult;

/// Holds the pool's tokens and moves them in and out.
///
/// Transfers are synchronous and failure-atomic: an `Err` means nothing
/// moved, and the engine discards its staged accounting.
pub trait Fund: Send + Sync {
    /// Pulls `amount` of `token` from `holder` into the pool.
    fn deposit_for(&self, holder: &AccountId, token: &InstrumentId, amount: u128)
        -> TraitResult<()>;

    /// Pays `amount` of `token` from the pool to `recipient`.
    fn withdraw(&self, token: &InstrumentId, recipient: &AccountId, amount: u128)
        -> TraitResult<()>;

    /// Pool balance of `token`.
    fn balance(&self, token: &InstrumentId) -> u128;
}
