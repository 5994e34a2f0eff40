//! Fixed-term bonds.
//!
//! A bond locks `original_price` for `runtime` seconds at a yield quoted from
//! the bucket its runtime falls in. Lending totals count each bond at the
//! midpoint of principal and promised return.

use std::sync::atomic::Ordering;

use lendcurve_core::error::CoreResult;
use lendcurve_core::fixed_point::{add, mul_div, FP32};
use lendcurve_core::{AccountId, BondId, InstrumentId, Timestamp};
use lendcurve_rates::{CurveError, LendingTargetPolicy, QuoteContext, RateParameters, RuntimeBounds};
use lendcurve_traits::{LendingEvent, WithdrawalOutcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::ledger::{credit_hourly, InstrumentLedger};
use crate::LendingEngine;

/// An issued fixed-term bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    /// Identifier, unique across all instruments.
    pub id: BondId,
    /// Owner; the only account allowed to withdraw.
    pub holder: AccountId,
    /// Issuer the bond was issued against.
    pub issuer: InstrumentId,
    /// Principal deposited.
    pub original_price: u128,
    /// Principal plus yield, fixed at issuance.
    pub return_amount: u128,
    /// Issuance time plus runtime.
    pub maturity: Timestamp,
    /// Duration in seconds.
    pub runtime: u64,
    /// Yield multiplier quoted at issuance.
    pub yield_fp: u128,
    /// Bucket the bond was booked into.
    pub bucket_index: usize,
}

impl Bond {
    /// Lending the bond accounts for: midpoint of principal and return.
    pub fn committed_lending(&self) -> CoreResult<u128> {
        midpoint(self.original_price, self.return_amount)
    }

    /// Withdrawable strictly after maturity.
    pub fn is_mature(&self, now: Timestamp) -> bool {
        now > self.maturity
    }
}

fn midpoint(principal: u128, return_amount: u128) -> CoreResult<u128> {
    Ok(add(principal, return_amount, "bond_midpoint")? / 2)
}

/// What issuing a bond would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondQuote {
    /// Bucket the runtime falls in.
    pub bucket_index: usize,
    /// Quoted yield multiplier.
    pub yield_fp: u128,
    /// `amount * yield_fp / FP32`.
    pub return_amount: u128,
}

/// Result of withdrawing a matured bond.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondSettlement {
    /// The retired bond.
    pub bond: Bond,
    /// Whether it was paid or moved to the hourly market.
    pub outcome: WithdrawalOutcome,
}

/// Quote against a locked ledger. Reads only, so a view and the following
/// issuance see the same numbers.
fn quote_locked(
    ledger: &InstrumentLedger,
    params: &RateParameters,
    bounds: &RuntimeBounds,
    policy: &dyn LendingTargetPolicy,
    runtime: u64,
    amount: u128,
    now: Timestamp,
) -> EngineResult<BondQuote> {
    let bucket_index = bounds.bucket_index(runtime, ledger.curve.len())?;
    let ctx = QuoteContext::new(
        params,
        policy.lending_target(&ledger.meta),
        ledger.meta.total_borrowed,
        ledger.meta.total_lending,
        ledger.borrow.hourly_yield_fp,
    );
    let yield_fp = ledger
        .curve
        .quote_yield_fp(bucket_index, amount, runtime, &ctx, now)?;
    Ok(BondQuote {
        bucket_index,
        yield_fp,
        return_amount: mul_div(amount, yield_fp, FP32)?,
    })
}

impl LendingEngine {
    // =========================================================================
    // QUOTES
    // =========================================================================

    /// Quotes a bond without changing state.
    pub fn quote_bond(
        &self,
        issuer: &InstrumentId,
        runtime: u64,
        amount: u128,
    ) -> EngineResult<BondQuote> {
        let params = self.rate_parameters();
        let bounds = self.runtime_bounds();
        let handle = self.existing_ledger(issuer)?;
        let ledger = handle.lock();
        let quote = quote_locked(
            &ledger,
            &params,
            &bounds,
            self.target_policy.as_ref(),
            runtime,
            amount,
            self.now(),
        )?;
        debug!(
            instrument = %issuer,
            runtime,
            amount = %amount,
            yield_fp = %quote.yield_fp,
            return_amount = %quote.return_amount,
            "bond quoted"
        );
        Ok(quote)
    }

    /// Amount a bond of `amount` for `runtime` would return at maturity.
    pub fn quote_bond_return(
        &self,
        issuer: &InstrumentId,
        runtime: u64,
        amount: u128,
    ) -> EngineResult<u128> {
        Ok(self.quote_bond(issuer, runtime, amount)?.return_amount)
    }

    // =========================================================================
    // ISSUANCE
    // =========================================================================

    /// Issues a bond.
    ///
    /// Returns `Ok(None)` without touching anything when the quoted return is
    /// below `min_return`.
    pub fn issue_bond(
        &self,
        holder: &AccountId,
        issuer: &InstrumentId,
        runtime: u64,
        amount: u128,
        min_return: u128,
    ) -> EngineResult<Option<BondId>> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        self.ensure_active(issuer)?;
        let token = self.token_for(issuer)?;
        let params = self.rate_parameters();
        let bounds = self.runtime_bounds();
        let now = self.now();

        // Issuance needs a curve, so an instrument without a ledger has none.
        let handle = self
            .existing_ledger(issuer)
            .map_err(|_| CurveError::BucketsNotInitialized)?;
        let mut ledger = handle.lock();

        let quote = quote_locked(
            &ledger,
            &params,
            &bounds,
            self.target_policy.as_ref(),
            runtime,
            amount,
            now,
        )?;
        if quote.return_amount < min_return {
            debug!(
                instrument = %issuer,
                holder = %holder,
                return_amount = %quote.return_amount,
                min_return = %min_return,
                "quoted return below minimum, bond not issued"
            );
            return Ok(None);
        }

        let committed = midpoint(amount, quote.return_amount)?;
        let mut meta = ledger.meta;
        meta.credit_lending(committed)?;
        if meta.exceeds_cap() {
            return Err(EngineError::LendingCapExceeded {
                instrument: issuer.clone(),
                cap: meta.lending_cap,
                requested: meta.total_lending,
            });
        }
        let mut bucket = *ledger.curve.bucket(quote.bucket_index)?;
        bucket.record_purchase(committed, amount, runtime, quote.yield_fp, now, &params.speed)?;

        let state = &mut *ledger;
        let slot = state.curve.bucket_mut(quote.bucket_index)?;
        self.fund.deposit_for(holder, &token, amount)?;
        *slot = bucket;
        state.meta = meta;

        let bond = Bond {
            id: BondId(self.next_bond_id.fetch_add(1, Ordering::SeqCst)),
            holder: holder.clone(),
            issuer: issuer.clone(),
            original_price: amount,
            return_amount: quote.return_amount,
            maturity: now.saturating_add(runtime),
            runtime,
            yield_fp: quote.yield_fp,
            bucket_index: quote.bucket_index,
        };
        self.bonds.insert(bond.id, bond.clone());
        drop(ledger);

        info!(
            bond = %bond.id,
            holder = %holder,
            instrument = %issuer,
            bucket = bond.bucket_index,
            principal = %amount,
            return_amount = %bond.return_amount,
            maturity = bond.maturity,
            "bond issued"
        );
        self.publish(LendingEvent::BondIssued {
            bond_id: bond.id,
            holder: bond.holder,
            instrument: bond.issuer,
            bucket_index: bond.bucket_index,
            principal: bond.original_price,
            return_amount: bond.return_amount,
            maturity: bond.maturity,
        });
        Ok(Some(bond.id))
    }

    // =========================================================================
    // WITHDRAWAL
    // =========================================================================

    /// Settles a matured bond.
    ///
    /// Pays `return_amount` out of custody when borrowing stays covered and
    /// custody holds enough. Otherwise publishes a liquidity warning and
    /// credits the full `return_amount` to the holder's hourly bond account.
    pub fn withdraw_bond(&self, caller: &AccountId, bond_id: BondId) -> EngineResult<BondSettlement> {
        let issuer = self
            .bonds
            .get(&bond_id)
            .map(|bond| bond.issuer.clone())
            .ok_or(EngineError::BondNotFound { bond_id })?;
        let token = self.token_for(&issuer)?;
        let params = self.rate_parameters();
        let handle = self.existing_ledger(&issuer)?;
        let mut ledger = handle.lock();

        // Re-read under the instrument lock; another withdrawal may have won.
        let bond = self
            .bonds
            .get(&bond_id)
            .map(|bond| bond.clone())
            .ok_or(EngineError::BondNotFound { bond_id })?;
        if bond.holder != *caller {
            return Err(EngineError::NotBondHolder {
                bond_id,
                caller: caller.clone(),
            });
        }
        let now = self.now();
        if !bond.is_mature(now) {
            return Err(EngineError::PrematureWithdrawal {
                bond_id,
                maturity: bond.maturity,
                now,
            });
        }

        let committed = bond.committed_lending()?;
        let mut meta = ledger.meta;
        meta.debit_lending(committed)?;
        let mut bucket = *ledger.curve.bucket(bond.bucket_index)?;
        bucket.record_withdrawal(committed, bond.original_price, bond.runtime, now, &params.speed)?;

        let custody_balance = self.fund.balance(&token);
        let shortfall = !meta.is_solvent() || custody_balance < bond.return_amount;
        let warning = shortfall.then(|| LendingEvent::LiquidityWarning {
            instrument: issuer.clone(),
            holder: bond.holder.clone(),
            amount: bond.return_amount,
            total_borrowed: meta.total_borrowed,
            total_lending: meta.total_lending,
            custody_balance,
        });

        let fallback = if shortfall {
            let mut market = ledger.refreshed_hourly(&params, self.target_policy.as_ref(), now)?;
            let mut account = ledger.account(&bond.holder);
            credit_hourly(&mut market, &mut meta, &mut account, bond.return_amount, now, &params)?;
            Some((market, account))
        } else {
            None
        };

        let state = &mut *ledger;
        let slot = state.curve.bucket_mut(bond.bucket_index)?;
        if !shortfall {
            self.fund.withdraw(&token, &bond.holder, bond.return_amount)?;
        }
        *slot = bucket;
        state.meta = meta;
        if let Some((market, account)) = fallback {
            state.hourly = market;
            state.store_account(&bond.holder, account);
        }
        self.bonds.remove(&bond_id);
        drop(ledger);

        let outcome = if shortfall {
            WithdrawalOutcome::Fallback
        } else {
            WithdrawalOutcome::Paid
        };
        if let Some(warning) = warning {
            warn!(
                instrument = %issuer,
                bond = %bond_id,
                holder = %bond.holder,
                amount = %bond.return_amount,
                custody_balance = %custody_balance,
                "liquidity shortfall, bond claim moved to hourly bonds"
            );
            self.publish(warning);
        }
        info!(
            bond = %bond_id,
            holder = %bond.holder,
            instrument = %issuer,
            return_amount = %bond.return_amount,
            outcome = ?outcome,
            "bond withdrawn"
        );
        self.publish(LendingEvent::BondWithdrawn {
            bond_id,
            holder: bond.holder.clone(),
            instrument: issuer,
            return_amount: bond.return_amount,
            outcome,
        });
        Ok(BondSettlement { bond, outcome })
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// An outstanding bond.
    pub fn bond(&self, bond_id: BondId) -> Option<Bond> {
        self.bonds.get(&bond_id).map(|bond| bond.clone())
    }

    /// Outstanding bonds of `holder`, oldest first.
    pub fn bonds_of(&self, holder: &AccountId) -> Vec<Bond> {
        let mut bonds: Vec<Bond> = self
            .bonds
            .iter()
            .filter(|entry| entry.holder == *holder)
            .map(|entry| entry.value().clone())
            .collect();
        bonds.sort_by_key(|bond| bond.id);
        bonds
    }
}
