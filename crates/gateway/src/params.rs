// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request parameter parsing with readable validation errors

use std::str::FromStr;

use alloy_primitives::{Address, B256};
use serde::Deserialize;
use shared_types::ChainId;

use crate::error::ServerError;

mod hints {
    pub const ADDRESS_FORMAT: &str = "expected a 0x-prefixed, 40 hex digit address";
    pub const HASH_FORMAT: &str = "expected a 0x-prefixed, 64 hex digit transaction hash";
    pub const PAGE_RANGE: &str = "page numbers start at 1";
}

/// Parse an account or contract address from a path segment
pub fn parse_address(field: &str, raw: &str) -> Result<Address, ServerError> {
    Address::from_str(raw.trim()).map_err(|_| {
        ServerError::Validation(format!(
            "invalid {field} '{raw}': {}",
            hints::ADDRESS_FORMAT
        ))
    })
}

/// Parse a transaction hash from a path segment
pub fn parse_tx_hash(raw: &str) -> Result<B256, ServerError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("0x") {
        return Err(ServerError::Validation(format!(
            "invalid transaction hash '{raw}': {}",
            hints::HASH_FORMAT
        )));
    }

    B256::from_str(trimmed).map_err(|_| {
        ServerError::Validation(format!(
            "invalid transaction hash '{raw}': {}",
            hints::HASH_FORMAT
        ))
    })
}

/// Parse a chain slug or numeric chain ID
pub fn parse_chain(raw: &str) -> Result<ChainId, ServerError> {
    ChainId::from_str(raw).map_err(|e| ServerError::Validation(e.to_string()))
}

/// `?page=` query for paginated explorer lists
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number, defaults to 1
    pub page: Option<u32>,
}

impl PageQuery {
    /// Validated page number
    pub fn page(&self) -> Result<u32, ServerError> {
        match self.page {
            None => Ok(1),
            Some(0) => Err(ServerError::Validation(format!(
                "invalid page 0: {}",
                hints::PAGE_RANGE
            ))),
            Some(page) => Ok(page),
        }
    }
}
