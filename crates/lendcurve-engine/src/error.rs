//! Engine error types.

use lendcurve_config::ConfigError;
use lendcurve_core::{AccountId, BondId, CoreError, InstrumentId, Timestamp};
use lendcurve_rates::CurveError;
use lendcurve_traits::{Role, TraitError};
use thiserror::Error;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
///
/// Every error is returned before any ledger state is committed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Amount must be positive.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// Instrument is not active in the registry.
    #[error("instrument {instrument} is not active")]
    InactiveInstrument {
        /// The instrument.
        instrument: InstrumentId,
    },

    /// No ledger exists for the instrument yet.
    #[error("no ledger for instrument {instrument}")]
    UnknownInstrument {
        /// The instrument.
        instrument: InstrumentId,
    },

    /// Issuer strategy has no token for the issuer.
    #[error("no token registered for issuer {issuer}")]
    UnknownIssuer {
        /// The issuer key.
        issuer: InstrumentId,
    },

    /// Caller lacks the required role.
    #[error("{account} lacks the {role} role")]
    Unauthorized {
        /// The caller.
        account: AccountId,
        /// The required role.
        role: Role,
    },

    /// No such bond.
    #[error("{bond_id} not found")]
    BondNotFound {
        /// The bond.
        bond_id: BondId,
    },

    /// Caller is not the bond's holder.
    #[error("{caller} is not the holder of {bond_id}")]
    NotBondHolder {
        /// The bond.
        bond_id: BondId,
        /// The caller.
        caller: AccountId,
    },

    /// Bond has not matured.
    #[error("{bond_id} matures at {maturity}, now {now}")]
    PrematureWithdrawal {
        /// The bond.
        bond_id: BondId,
        /// Maturity timestamp; withdrawal needs a later time.
        maturity: Timestamp,
        /// Current time.
        now: Timestamp,
    },

    /// Deposit would push lending past the cap.
    #[error("lending cap {cap} of {instrument} exceeded: {requested} requested")]
    LendingCapExceeded {
        /// The instrument.
        instrument: InstrumentId,
        /// Current cap.
        cap: u128,
        /// Total lending after the deposit.
        requested: u128,
    },

    /// Pool cannot cover the operation.
    #[error("insufficient liquidity in {instrument}: {reason}")]
    InsufficientLiquidity {
        /// The instrument.
        instrument: InstrumentId,
        /// What fell short.
        reason: String,
    },

    /// Hourly-bond account holds less than requested.
    #[error("{holder} holds {available} hourly bonds of {instrument}, {requested} requested")]
    InsufficientHourlyBalance {
        /// The instrument.
        instrument: InstrumentId,
        /// Account holder.
        holder: AccountId,
        /// Requested amount.
        requested: u128,
        /// Settled balance.
        available: u128,
    },

    /// Hourly bonds can only be withdrawn early in each hour of the position.
    #[error("hourly withdrawal window of {window}s passed ({seconds_into_hour}s into the hour)")]
    OutsideWithdrawalWindow {
        /// Seconds since the position's last hourly anniversary.
        seconds_into_hour: u64,
        /// Window length.
        window: u64,
    },

    /// Administrative value rejected.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What's invalid.
        reason: String,
    },

    /// Curve or runtime-bound error.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Fixed-point arithmetic error.
    #[error(transparent)]
    Arithmetic(#[from] CoreError),

    /// Custody transfer failed.
    #[error("custody error: {0}")]
    Custody(#[from] TraitError),

    /// Engine configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Coarse classification of [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request (zero amount, unknown ids).
    InvalidInput,
    /// Runtime or runtime bounds out of range.
    InvalidRange,
    /// Caller not allowed.
    Authorization,
    /// Withdrawal before maturity.
    PrematureWithdrawal,
    /// Bucket count differs from the configured curve.
    ConfigurationMismatch,
    /// Other rejected administrative input.
    InvalidConfiguration,
    /// Not enough lending or custody balance.
    InsufficientLiquidity,
    /// Lending cap reached.
    CapExceeded,
    /// Instrument inactive.
    Inactive,
    /// Fixed-point overflow or underflow.
    Arithmetic,
    /// Custody transfer failed.
    Custody,
}

impl EngineError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ZeroAmount
            | EngineError::UnknownInstrument { .. }
            | EngineError::UnknownIssuer { .. }
            | EngineError::BondNotFound { .. } => ErrorKind::InvalidInput,
            EngineError::InactiveInstrument { .. } => ErrorKind::Inactive,
            EngineError::Unauthorized { .. } | EngineError::NotBondHolder { .. } => {
                ErrorKind::Authorization
            }
            EngineError::PrematureWithdrawal { .. } => ErrorKind::PrematureWithdrawal,
            EngineError::LendingCapExceeded { .. } => ErrorKind::CapExceeded,
            EngineError::InsufficientLiquidity { .. }
            | EngineError::InsufficientHourlyBalance { .. }
            | EngineError::OutsideWithdrawalWindow { .. } => ErrorKind::InsufficientLiquidity,
            EngineError::InvalidConfiguration { .. } | EngineError::Config(_) => {
                ErrorKind::InvalidConfiguration
            }
            EngineError::Curve(err) => match err {
                CurveError::RuntimeOutOfRange { .. }
                | CurveError::InvalidRuntimeBounds { .. }
                | CurveError::ZeroBucketWidth { .. } => ErrorKind::InvalidRange,
                CurveError::ConfigurationMismatch { .. } => ErrorKind::ConfigurationMismatch,
                CurveError::Arithmetic(_) => ErrorKind::Arithmetic,
                CurveError::BucketsNotInitialized
                | CurveError::BucketIndexOutOfRange { .. }
                | CurveError::InvalidWeights { .. }
                | CurveError::InvalidYield { .. } => ErrorKind::InvalidConfiguration,
            },
            EngineError::Arithmetic(_) => ErrorKind::Arithmetic,
            EngineError::Custody(_) => ErrorKind::Custody,
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub(crate) fn insufficient_liquidity(
        instrument: &InstrumentId,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InsufficientLiquidity {
            instrument: instrument.clone(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_curve_errors() {
        let err: EngineError = CurveError::runtime_out_of_range(1, 2, 3).into();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);

        let err: EngineError = CurveError::mismatch(2, 3).into();
        assert_eq!(err.kind(), ErrorKind::ConfigurationMismatch);
    }

    #[test]
    fn test_display() {
        let err = EngineError::PrematureWithdrawal {
            bond_id: BondId(7),
            maturity: 100,
            now: 50,
        };
        assert_eq!(err.to_string(), "bond#7 matures at 100, now 50");
    }
}
