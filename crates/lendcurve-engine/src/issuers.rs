//! Issuer strategies.
//!
//! Cross-margin lending keys ledgers by the token itself. Isolated-margin
//! lending keys them by a pair-specific issuer that settles in a token.

use dashmap::DashMap;
use lendcurve_core::InstrumentId;
use lendcurve_traits::IssuerStrategy;

/// Every issuer is its own token.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossMarginIssuers;

impl IssuerStrategy for CrossMarginIssuers {
    fn token_for(&self, issuer: &InstrumentId) -> Option<InstrumentId> {
        Some(issuer.clone())
    }
}

/// Explicit issuer-to-token mapping; unregistered issuers are unknown.
#[derive(Debug, Default)]
pub struct IsolatedMarginIssuers {
    tokens: DashMap<InstrumentId, InstrumentId>,
}

impl IsolatedMarginIssuers {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `issuer` to `token`, replacing any earlier mapping.
    pub fn register(&self, issuer: InstrumentId, token: InstrumentId) {
        self.tokens.insert(issuer, token);
    }
}

impl IssuerStrategy for IsolatedMarginIssuers {
    fn token_for(&self, issuer: &InstrumentId) -> Option<InstrumentId> {
        self.tokens.get(issuer).map(|token| token.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_margin_is_identity() {
        let dai = InstrumentId::new("DAI");
        assert_eq!(CrossMarginIssuers.token_for(&dai), Some(dai));
    }

    #[test]
    fn test_isolated_margin_lookup() {
        let issuers = IsolatedMarginIssuers::new();
        let pair = InstrumentId::new("ETH/DAI:DAI");
        assert_eq!(issuers.token_for(&pair), None);

        issuers.register(pair.clone(), InstrumentId::new("DAI"));
        assert_eq!(issuers.token_for(&pair), Some(InstrumentId::new("DAI")));
    }
}
