//! In-memory custody.
//!
//! Holds one pool balance per token and one wallet balance per holder and
//! token. Useful for testing and simulation; nothing is persisted.

use std::collections::HashMap;

use lendcurve_core::{AccountId, InstrumentId};
use lendcurve_traits::{Fund, TraitError, TraitResult};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Balances {
    pool: HashMap<InstrumentId, u128>,
    wallets: HashMap<(AccountId, InstrumentId), u128>,
}

/// In-memory [`Fund`].
///
/// # Example
///
/// ```rust
/// use lendcurve_core::{AccountId, InstrumentId};
/// use lendcurve_engine::InMemoryFund;
/// use lendcurve_traits::Fund;
///
/// let fund = InMemoryFund::new();
/// let alice = AccountId::new("alice");
/// let dai = InstrumentId::new("DAI");
///
/// fund.fund_wallet(&alice, &dai, 1_000);
/// fund.deposit_for(&alice, &dai, 400).unwrap();
/// assert_eq!(fund.balance(&dai), 400);
/// assert_eq!(fund.wallet_balance(&alice, &dai), 600);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryFund {
    balances: Mutex<Balances>,
}

impl InMemoryFund {
    /// Creates empty custody.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints `amount` of `token` into `holder`'s wallet.
    pub fn fund_wallet(&self, holder: &AccountId, token: &InstrumentId, amount: u128) {
        let mut balances = self.balances.lock();
        let wallet = balances
            .wallets
            .entry((holder.clone(), token.clone()))
            .or_default();
        *wallet = wallet.saturating_add(amount);
    }

    /// Wallet balance of `holder`.
    pub fn wallet_balance(&self, holder: &AccountId, token: &InstrumentId) -> u128 {
        self.balances
            .lock()
            .wallets
            .get(&(holder.clone(), token.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Adds tokens to the pool directly, e.g. a borrower repaying.
    pub fn credit_pool(&self, token: &InstrumentId, amount: u128) {
        let mut balances = self.balances.lock();
        let pool = balances.pool.entry(token.clone()).or_default();
        *pool = pool.saturating_add(amount);
    }

    /// Removes up to `amount` from the pool, e.g. a borrower drawing funds.
    /// Returns what was removed.
    pub fn drain(&self, token: &InstrumentId, amount: u128) -> u128 {
        let mut balances = self.balances.lock();
        let pool = balances.pool.entry(token.clone()).or_default();
        let drained = amount.min(*pool);
        *pool -= drained;
        drained
    }
}

impl Fund for InMemoryFund {
    fn deposit_for(&self, holder: &AccountId, token: &InstrumentId, amount: u128) -> TraitResult<()> {
        let mut balances = self.balances.lock();
        let key = (holder.clone(), token.clone());
        let available = balances.wallets.get(&key).copied().unwrap_or(0);
        if available < amount {
            return Err(TraitError::InsufficientBalance(format!(
                "{holder} holds {available} {token}, {amount} required"
            )));
        }
        balances.wallets.insert(key, available - amount);
        let pool = balances.pool.entry(token.clone()).or_default();
        *pool = pool
            .checked_add(amount)
            .ok_or_else(|| TraitError::Internal(format!("{token} pool overflow")))?;
        Ok(())
    }

    fn withdraw(&self, token: &InstrumentId, recipient: &AccountId, amount: u128) -> TraitResult<()> {
        let mut balances = self.balances.lock();
        let pool = balances.pool.get(token).copied().unwrap_or(0);
        if pool < amount {
            return Err(TraitError::InsufficientBalance(format!(
                "pool holds {pool} {token}, {amount} requested"
            )));
        }
        balances.pool.insert(token.clone(), pool - amount);
        let wallet = balances
            .wallets
            .entry((recipient.clone(), token.clone()))
            .or_default();
        *wallet = wallet.saturating_add(amount);
        Ok(())
    }

    fn balance(&self, token: &InstrumentId) -> u128 {
        self.balances.lock().pool.get(token).copied().unwrap_or(0)
    }
}
