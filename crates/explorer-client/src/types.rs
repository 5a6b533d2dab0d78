// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Wire types and query parameters for Etherscan-style explorer APIs
//!
//! Explorers return every numeric field as a decimal string. Records keep the
//! strings as received and expose parsed accessors where callers need numbers.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Highest block number used as the open end of a block range
pub const DEFAULT_END_BLOCK: u64 = 999_999_999;
/// Default page size for list queries
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Response envelope shared by all explorer endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// `"1"` on success, `"0"` on failure or empty result
    pub status: String,
    /// Short status text, `"NOTOK"` on API errors
    pub message: String,
    /// Endpoint-specific payload, or the error detail on failure
    #[serde(default)]
    pub result: Value,
}

impl Envelope {
    /// Whether this envelope carries the explorer's error signal
    pub fn is_error(&self) -> bool {
        self.status == "0" && self.message == "NOTOK"
    }
}

/// Sort order for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Parameters of a normal transaction list query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxListQuery {
    /// First block to include
    pub start_block: u64,
    /// Last block to include
    pub end_block: u64,
    /// 1-based page number
    pub page: u32,
    /// Results per page
    pub offset: u32,
    /// Result ordering
    pub sort: SortOrder,
}

impl Default for TxListQuery {
    fn default() -> Self {
        Self {
            start_block: 0,
            end_block: DEFAULT_END_BLOCK,
            page: 1,
            offset: DEFAULT_PAGE_SIZE,
            sort: SortOrder::Desc,
        }
    }
}

impl TxListQuery {
    /// Default query for the given page
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }
}

/// Parameters of a token transfer list query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenTransferQuery {
    /// First block to include
    pub start_block: u64,
    /// Last block to include
    pub end_block: u64,
    /// 1-based page number
    pub page: u32,
    /// Results per page
    pub offset: u32,
    /// Result ordering
    pub sort: SortOrder,
}

impl Default for TokenTransferQuery {
    fn default() -> Self {
        Self {
            start_block: 0,
            end_block: DEFAULT_END_BLOCK,
            page: 1,
            offset: DEFAULT_PAGE_SIZE,
            sort: SortOrder::Asc,
        }
    }
}

impl TokenTransferQuery {
    /// Default query for the given page
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }
}

/// A normal (native coin) transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct Transaction {
    pub block_number: String,
    pub time_stamp: String,
    pub hash: String,
    pub nonce: String,
    pub block_hash: String,
    pub transaction_index: String,
    pub from: String,
    pub to: String,
    /// Amount in wei, decimal
    pub value: String,
    pub gas: String,
    pub gas_price: String,
    /// `"1"` when execution reverted
    pub is_error: String,
    #[serde(rename = "txreceipt_status")]
    pub txreceipt_status: String,
    pub input: String,
    pub contract_address: String,
    pub cumulative_gas_used: String,
    pub gas_used: String,
    pub confirmations: String,
    pub method_id: String,
    pub function_name: String,
}

impl Transaction {
    /// Transferred amount in wei
    pub fn value_wei(&self) -> Option<U256> {
        parse_decimal(&self.value)
    }

    /// Whether the transaction executed without reverting
    pub fn succeeded(&self) -> bool {
        self.is_error != "1"
    }

    /// Whether `address` is the sender or the recipient
    pub fn involves(&self, address: Address) -> bool {
        same_address(&self.from, address) || same_address(&self.to, address)
    }

    /// Whether the transaction was sent from `from` to `to`
    pub fn is_transfer(&self, from: Address, to: Address) -> bool {
        same_address(&self.from, from) && same_address(&self.to, to)
    }
}

/// A token (ERC20-style) transfer event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct TokenTransfer {
    pub block_number: String,
    pub time_stamp: String,
    pub hash: String,
    pub nonce: String,
    pub block_hash: String,
    pub from: String,
    pub contract_address: String,
    pub to: String,
    /// Amount in the token's smallest unit, decimal
    pub value: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_decimal: String,
    pub transaction_index: String,
    pub gas: String,
    pub gas_price: String,
    pub gas_used: String,
    pub cumulative_gas_used: String,
    pub input: String,
    pub confirmations: String,
}

impl TokenTransfer {
    /// Transferred amount in the token's smallest unit
    pub fn amount(&self) -> Option<U256> {
        parse_decimal(&self.value)
    }

    /// Whether the transfer moved tokens from `from` to `to`
    pub fn is_transfer(&self, from: Address, to: Address) -> bool {
        same_address(&self.from, from) && same_address(&self.to, to)
    }
}

/// Execution status of a transaction receipt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptStatus {
    /// `"1"` for success, `"0"` for failure, empty for pre-Byzantium or pending
    #[serde(default)]
    pub status: String,
}

impl ReceiptStatus {
    /// Whether the receipt reports successful execution
    pub fn is_success(&self) -> bool {
        self.status == "1"
    }

    /// Whether the receipt reports a reverted execution
    pub fn is_failure(&self) -> bool {
        self.status == "0"
    }
}

/// Token balance returned by the explorer as a decimal string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct TokenBalance(pub U256);

impl TryFrom<String> for TokenBalance {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_decimal(&value)
            .map(Self)
            .ok_or_else(|| format!("invalid token balance: {value:?}"))
    }
}

fn parse_decimal(value: &str) -> Option<U256> {
    U256::from_str_radix(value.trim(), 10).ok()
}

fn same_address(field: &str, address: Address) -> bool {
    field
        .parse::<Address>()
        .is_ok_and(|parsed| parsed == address)
}
