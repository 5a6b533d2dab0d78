// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Tracked token definitions

use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};

/// An ERC20-style token whose balances and deposits are tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedToken {
    /// Ticker symbol, e.g. `USDT`
    pub symbol: String,
    /// Token contract address
    pub contract: Address,
    /// Number of decimals used by the token contract
    pub decimals: u8,
}

impl TrackedToken {
    /// Create a new tracked token
    pub fn new(symbol: impl Into<String>, contract: Address, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            contract,
            decimals,
        }
    }
}

/// Stablecoins tracked on BNB Smart Chain when no token list is configured
///
/// The native coin is not listed here; it is read with `eth_getBalance` rather
/// than through a token contract.
pub fn default_bsc_tokens() -> Vec<TrackedToken> {
    vec![
        TrackedToken::new(
            "USDT",
            address!("0x55d398326f99059fF775485246999027B3197955"),
            18,
        ),
        TrackedToken::new(
            "USDC",
            address!("0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"),
            18,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tokens_have_distinct_contracts() {
        let tokens = default_bsc_tokens();
        assert_eq!(tokens.len(), 2);
        assert_ne!(tokens[0].contract, tokens[1].contract);
        assert!(tokens.iter().all(|t| t.decimals == 18));
    }

    #[test]
    fn tracked_token_roundtrips_through_json() {
        let token = TrackedToken::new("USDT", Address::from([0x11; 20]), 6);
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["symbol"], "USDT");
        assert_eq!(json["decimals"], 6);

        let parsed: TrackedToken = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, token);
    }
}
