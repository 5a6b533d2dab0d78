// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Account balances with explorer-to-node fallback
//!
//! Token balances come from the explorer when it answers. Any explorer failure,
//! whether rate limiting, a transport error or a malformed payload, sends the
//! read to the chain instead. The native balance is always read on chain since
//! the explorer offers no cached equivalent.

use alloy_primitives::{Address, U256};
use explorer_client::ExplorerClient;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use shared_types::TrackedToken;
use tracing::{debug, warn};

use crate::{error::ServerResult, metrics, onchain::OnChainReader};

/// Symbol reported for the BNB Smart Chain native coin
pub const NATIVE_SYMBOL: &str = "BNB";
/// Decimals of the BNB Smart Chain native coin
pub const NATIVE_DECIMALS: u8 = 18;

/// Where a balance was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSource {
    /// Explorer `tokenbalance` response
    Explorer,
    /// Direct node read
    OnChain,
}

/// One asset balance in base units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    /// Ticker symbol
    pub symbol: String,
    /// Token contract, absent for the native coin
    pub contract: Option<Address>,
    /// Decimals to scale `amount` by
    pub decimals: u8,
    /// Raw integer amount as a decimal string
    pub amount: String,
    /// Where the amount was read from
    pub source: BalanceSource,
}

impl AssetBalance {
    fn native(amount: U256) -> Self {
        Self {
            symbol: NATIVE_SYMBOL.to_string(),
            contract: None,
            decimals: NATIVE_DECIMALS,
            amount: amount.to_string(),
            source: BalanceSource::OnChain,
        }
    }

    fn token(token: &TrackedToken, amount: U256, source: BalanceSource) -> Self {
        Self {
            symbol: token.symbol.clone(),
            contract: Some(token.contract),
            decimals: token.decimals,
            amount: amount.to_string(),
            source,
        }
    }
}

/// Native and tracked token balances of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Account the balances belong to
    pub account: Address,
    /// Native coin balance
    pub native: AssetBalance,
    /// Tracked token balances, in configured order
    pub tokens: Vec<AssetBalance>,
}

/// Read a tracked token balance, falling back to the chain if the explorer fails
pub async fn token_balance(
    explorer: &ExplorerClient,
    reader: &OnChainReader,
    account: Address,
    token: &TrackedToken,
) -> ServerResult<AssetBalance> {
    let from_explorer = explorer.get_token_balance(account, token.contract).await;
    metrics::record_explorer_call("tokenbalance", &from_explorer);

    match from_explorer {
        Ok(amount) => {
            debug!(account = %account, token = %token.symbol, "Token balance served by explorer");
            Ok(AssetBalance::token(token, amount, BalanceSource::Explorer))
        }
        Err(e) => {
            warn!(
                account = %account,
                token = %token.symbol,
                error = %e,
                "Explorer balance lookup failed, reading from chain"
            );
            let on_chain = reader.token_balance(account, token.contract).await;
            metrics::record_fallback(reader.chain(), on_chain.is_ok());
            Ok(AssetBalance::token(token, on_chain?, BalanceSource::OnChain))
        }
    }
}

/// Read the native balance and every tracked token balance of `account`
///
/// Token lookups run concurrently; the explorer's rate gate still spaces the
/// underlying requests.
pub async fn balance_report(
    explorer: &ExplorerClient,
    reader: &OnChainReader,
    account: Address,
    tokens: &[TrackedToken],
) -> ServerResult<BalanceReport> {
    let native = reader.native_balance(account).await?;
    let tokens = try_join_all(
        tokens
            .iter()
            .map(|token| token_balance(explorer, reader, account, token)),
    )
    .await?;

    Ok(BalanceReport {
        account,
        native: AssetBalance::native(native),
        tokens,
    })
}
