//! Engine events.
//!
//! Every state change the engine commits is published as a [`LendingEvent`].
//! Liquidity shortfalls are not errors; [`LendingEvent::LiquidityWarning`] is
//! how operators observe them.

use lendcurve_core::{AccountId, BondId, InstrumentId, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::TryRecvError;

// =============================================================================
// EVENTS
// =============================================================================

/// How a matured bond was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalOutcome {
    /// The return amount was paid out of custody.
    Paid,
    /// The claim was moved into the holder's hourly-bond account.
    Fallback,
}

/// Events published by the lending engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LendingEvent {
    /// A fixed-term bond was issued.
    BondIssued {
        /// New bond identifier.
        bond_id: BondId,
        /// Bond holder.
        holder: AccountId,
        /// Issuer the bond was issued against.
        instrument: InstrumentId,
        /// Bucket the bond was booked into.
        bucket_index: usize,
        /// Principal deposited.
        principal: u128,
        /// Amount owed at maturity.
        return_amount: u128,
        /// Earliest withdrawal time is strictly after this.
        maturity: Timestamp,
    },

    /// A matured bond was settled.
    BondWithdrawn {
        /// Retired bond identifier.
        bond_id: BondId,
        /// Bond holder.
        holder: AccountId,
        /// Issuer the bond was issued against.
        instrument: InstrumentId,
        /// Amount settled.
        return_amount: u128,
        /// Direct payout or hourly fallback.
        outcome: WithdrawalOutcome,
    },

    /// A withdrawal could not be paid directly.
    LiquidityWarning {
        /// Affected issuer.
        instrument: InstrumentId,
        /// Holder whose claim moved to the hourly market.
        holder: AccountId,
        /// Claim size.
        amount: u128,
        /// Borrowed total at the time.
        total_borrowed: u128,
        /// Lending total at the time (after the bond's debit).
        total_lending: u128,
        /// Tokens held in custody at the time.
        custody_balance: u128,
    },

    /// Hourly-bond balance purchased. Fallback credits are reported by `LiquidityWarning`.
    HourlyBondBought {
        /// Issuer.
        instrument: InstrumentId,
        /// Account holder.
        holder: AccountId,
        /// Amount credited.
        amount: u128,
    },

    /// Hourly-bond balance paid out.
    HourlyBondWithdrawn {
        /// Issuer.
        instrument: InstrumentId,
        /// Account holder.
        holder: AccountId,
        /// Amount paid.
        amount: u128,
    },

    /// Borrowing registered against the pool.
    BorrowRegistered {
        /// Issuer.
        instrument: InstrumentId,
        /// Amount borrowed.
        amount: u128,
    },

    /// Borrowing repaid.
    BorrowRepaid {
        /// Issuer.
        instrument: InstrumentId,
        /// Amount repaid.
        amount: u128,
    },

    /// Bucket weights configured.
    RuntimeWeightsSet {
        /// Issuer.
        instrument: InstrumentId,
        /// New weights, shortest runtimes first.
        weights: Vec<u32>,
    },

    /// Bucket yields overwritten.
    RuntimeYieldsSet {
        /// Issuer.
        instrument: InstrumentId,
        /// New FP32 yields.
        yields_fp: Vec<u128>,
    },

    /// Global runtime bounds changed.
    RuntimeBoundsSet {
        /// Shortest accepted runtime.
        min_runtime: u64,
        /// Longest accepted runtime.
        max_runtime: u64,
    },

    /// Lending cap changed.
    LendingCapSet {
        /// Issuer.
        instrument: InstrumentId,
        /// New cap.
        cap: u128,
    },

    /// Hourly-bond rate set by an administrator.
    HourlyYieldSet {
        /// Issuer.
        instrument: InstrumentId,
        /// New FP32 hourly multiplier.
        hourly_yield_fp: u128,
    },

    /// A global rate parameter changed.
    RateParameterSet {
        /// Parameter name.
        parameter: String,
        /// New value in engine units.
        value: u128,
    },
}

impl LendingEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            LendingEvent::BondIssued { .. } => "bond_issued",
            LendingEvent::BondWithdrawn { .. } => "bond_withdrawn",
            LendingEvent::LiquidityWarning { .. } => "liquidity_warning",
            LendingEvent::HourlyBondBought { .. } => "hourly_bond_bought",
            LendingEvent::HourlyBondWithdrawn { .. } => "hourly_bond_withdrawn",
            LendingEvent::BorrowRegistered { .. } => "borrow_registered",
            LendingEvent::BorrowRepaid { .. } => "borrow_repaid",
            LendingEvent::RuntimeWeightsSet { .. } => "runtime_weights_set",
            LendingEvent::RuntimeYieldsSet { .. } => "runtime_yields_set",
            LendingEvent::RuntimeBoundsSet { .. } => "runtime_bounds_set",
            LendingEvent::LendingCapSet { .. } => "lending_cap_set",
            LendingEvent::HourlyYieldSet { .. } => "hourly_yield_set",
            LendingEvent::RateParameterSet { .. } => "rate_parameter_set",
        }
    }

    /// Instrument the event concerns, if any.
    pub fn instrument(&self) -> Option<&InstrumentId> {
        match self {
            LendingEvent::BondIssued { instrument, .. }
            | LendingEvent::BondWithdrawn { instrument, .. }
            | LendingEvent::LiquidityWarning { instrument, .. }
            | LendingEvent::HourlyBondBought { instrument, .. }
            | LendingEvent::HourlyBondWithdrawn { instrument, .. }
            | LendingEvent::BorrowRegistered { instrument, .. }
            | LendingEvent::BorrowRepaid { instrument, .. }
            | LendingEvent::RuntimeWeightsSet { instrument, .. }
            | LendingEvent::RuntimeYieldsSet { instrument, .. }
            | LendingEvent::LendingCapSet { instrument, .. }
            | LendingEvent::HourlyYieldSet { instrument, .. } => Some(instrument),
            LendingEvent::RuntimeBoundsSet { .. } | LendingEvent::RateParameterSet { .. } => None,
        }
    }
}

// =============================================================================
// PUBLISHING
// =============================================================================

/// Receives events after the engine commits a state change.
///
/// Publishing is fire-and-forget; a publisher must not call back into the
/// engine.
pub trait EventPublisher: Send + Sync {
    /// Publishes one event.
    fn publish(&self, event: LendingEvent);
}

/// Receiver for streamed events.
pub struct EventReceiver {
    rx: tokio::sync::broadcast::Receiver<LendingEvent>,
}

impl EventReceiver {
    /// Create a new event receiver.
    pub fn new(rx: tokio::sync::broadcast::Receiver<LendingEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next event.
    pub async fn recv(&mut self) -> Option<LendingEvent> {
        self.rx.recv().await.ok()
    }

    /// Next buffered event without waiting. Skips over lagged gaps.
    pub fn try_recv(&mut self) -> Option<LendingEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drains every buffered event.
    pub fn drain(&mut self) -> Vec<LendingEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
