// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Incubator deposit aggregation and history filtering

use alloy_primitives::{Address, U256};
use explorer_client::{ExplorerClient, TokenTransfer, TokenTransferQuery, Transaction};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use shared_types::TrackedToken;
use tracing::debug;

use crate::{
    balances::{NATIVE_DECIMALS, NATIVE_SYMBOL},
    error::ServerResult,
    metrics,
};

/// Total deposited of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositTotal {
    /// Ticker symbol
    pub symbol: String,
    /// Token contract, absent for the native coin
    pub contract: Option<Address>,
    /// Decimals to scale `total` by
    pub decimals: u8,
    /// Sum of deposited base units as a decimal string
    pub total: String,
    /// Number of transfers counted
    pub transfers: usize,
}

/// Deposits from one account into the incubator wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSummary {
    /// Depositing account
    pub account: Address,
    /// Receiving incubator wallet
    pub incubator_wallet: Address,
    /// Native coin deposits
    pub native: DepositTotal,
    /// Tracked token deposits, in configured order
    pub tokens: Vec<DepositTotal>,
}

/// Sum the value of successful native transfers from `from` to `to`
pub fn sum_native_deposits(transactions: &[Transaction], from: Address, to: Address) -> (U256, usize) {
    transactions
        .iter()
        .filter(|tx| tx.succeeded() && tx.is_transfer(from, to))
        .filter_map(Transaction::value_wei)
        .fold((U256::ZERO, 0), |(total, count), value| {
            (total.saturating_add(value), count + 1)
        })
}

/// Sum the amounts of token transfers from `from` to `to`
pub fn sum_token_deposits(transfers: &[TokenTransfer], from: Address, to: Address) -> (U256, usize) {
    transfers
        .iter()
        .filter(|transfer| transfer.is_transfer(from, to))
        .filter_map(TokenTransfer::amount)
        .fold((U256::ZERO, 0), |(total, count), amount| {
            (total.saturating_add(amount), count + 1)
        })
}

/// Keep only transactions sent to or from `wallet`
pub fn incubator_history(transactions: Vec<Transaction>, wallet: Address) -> Vec<Transaction> {
    transactions
        .into_iter()
        .filter(|tx| tx.involves(wallet))
        .collect()
}

/// Aggregate native and tracked token deposits from `account` into `wallet`
pub async fn deposit_summary(
    explorer: &ExplorerClient,
    account: Address,
    wallet: Address,
    tokens: &[TrackedToken],
) -> ServerResult<DepositSummary> {
    let transactions = explorer.get_normal_transactions(account, Some(wallet)).await;
    metrics::record_explorer_call("txlist", &transactions);
    let (native_total, native_count) = sum_native_deposits(&transactions?, account, wallet);

    let token_totals = try_join_all(tokens.iter().map(|token| async move {
        let transfers = explorer
            .get_token_transfers(account, token.contract, TokenTransferQuery::default())
            .await;
        metrics::record_explorer_call("tokentx", &transfers);
        let (total, count) = sum_token_deposits(&transfers?, account, wallet);

        ServerResult::Ok(DepositTotal {
            symbol: token.symbol.clone(),
            contract: Some(token.contract),
            decimals: token.decimals,
            total: total.to_string(),
            transfers: count,
        })
    }))
    .await?;

    debug!(
        account = %account,
        native_transfers = native_count,
        tokens = token_totals.len(),
        "Aggregated incubator deposits"
    );

    Ok(DepositSummary {
        account,
        incubator_wallet: wallet,
        native: DepositTotal {
            symbol: NATIVE_SYMBOL.to_string(),
            contract: None,
            decimals: NATIVE_DECIMALS,
            total: native_total.to_string(),
            transfers: native_count,
        },
        tokens: token_totals,
    })
}
