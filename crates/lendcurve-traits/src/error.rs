//! Error types for collaborator operations.

use thiserror::Error;

/// Result alias for collaborator calls.
pub type TraitResult<T> = Result<T, TraitError>;

/// Common error type for collaborator operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraitError {
    /// Requested resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Account or pool balance too small for the transfer
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Token transfer failed
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
