//! Identifier types used across the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lent asset identifier (token symbol or address).
///
/// Ledgers are keyed by this identifier; under isolated margin it names the
/// issuer, which the issuer strategy maps onto the token custody moves.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    /// Create a new instrument ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Account identifier (bond holders, administrators, borrowers).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create a new account ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Fixed-term bond identifier.
///
/// Allocated from a single counter shared by all instruments; identifiers
/// start at 1 and are never reused.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BondId(pub u64);

impl BondId {
    /// Get the raw identifier.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BondId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bond#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(InstrumentId::new("DAI").to_string(), "DAI");
        assert_eq!(AccountId::from("alice").as_str(), "alice");
        assert_eq!(BondId(7).to_string(), "bond#7");
    }

    #[test]
    fn test_serde_transparent_shape() {
        let json = serde_json::to_string(&BondId(3)).unwrap();
        assert_eq!(json, "3");
    }
}
