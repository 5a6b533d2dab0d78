// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Direct node reads with endpoint failover
//!
//! A read goes to the registry's fastest healthy endpoint first. If that call
//! fails it is retried exactly once on the next endpoint in rotation.

use std::sync::Arc;

use alloy_primitives::{Address, U256, hex};
use endpoint_registry::{EndpointRegistry, JsonRpcCaller, JsonRpcProbe, RpcCallError};
use serde_json::{Value, json};
use shared_types::ChainId;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{
    error::{ServerError, ServerResult},
    metrics,
};

/// Selector of `balanceOf(address)`
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Reads EVM state through one chain's endpoint registry
#[derive(Debug, Clone)]
pub struct OnChainReader {
    registry: Arc<EndpointRegistry<JsonRpcProbe>>,
    caller: Arc<JsonRpcCaller>,
}

impl OnChainReader {
    /// Create a reader over `registry`, sending calls through `caller`
    pub fn new(registry: Arc<EndpointRegistry<JsonRpcProbe>>, caller: Arc<JsonRpcCaller>) -> Self {
        Self { registry, caller }
    }

    /// Chain this reader talks to
    pub fn chain(&self) -> ChainId {
        self.registry.chain()
    }

    /// Native coin balance of `account` at the latest block
    pub async fn native_balance(&self, account: Address) -> ServerResult<U256> {
        let raw: String = self
            .call_with_failover("eth_getBalance", json!([account, "latest"]))
            .await?;
        parse_quantity(&raw)
    }

    /// ERC20 `balanceOf(account)` on `contract` at the latest block
    pub async fn token_balance(&self, account: Address, contract: Address) -> ServerResult<U256> {
        let call = json!({
            "to": contract,
            "data": balance_of_calldata(account),
        });
        let raw: String = self
            .call_with_failover("eth_call", json!([call, "latest"]))
            .await?;
        parse_quantity(&raw)
    }

    async fn call_with_failover(&self, method: &str, params: Value) -> ServerResult<String> {
        let chain = self.chain();
        let primary = self.registry.get_fastest_healthy_rpc();

        match self.timed_call(&primary, method, params.clone()).await {
            Ok(result) => Ok(result),
            Err(first) => {
                let secondary = self.registry.get_next_rpc();
                warn!(
                    chain = %chain,
                    method = %method,
                    url = %primary,
                    retry_url = %secondary,
                    error = %first,
                    "RPC call failed, retrying on next endpoint"
                );
                self.timed_call(&secondary, method, params)
                    .await
                    .map_err(|source| ServerError::Rpc { chain, source })
            }
        }
    }

    async fn timed_call(
        &self,
        url: &str,
        method: &str,
        params: Value,
    ) -> Result<String, RpcCallError> {
        let started = Instant::now();
        let result = self.caller.call::<String>(url, method, params).await;
        let label = if result.is_ok() { "success" } else { "failure" };
        metrics::observe_rpc_call(
            self.chain(),
            method,
            label,
            started.elapsed().as_secs_f64(),
        );
        debug!(url = %url, method = %method, result = label, "RPC call finished");
        result
    }
}

/// ABI-encoded `balanceOf(account)` call data, 0x-prefixed
pub fn balance_of_calldata(account: Address) -> String {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(account.into_word().as_slice());
    hex::encode_prefixed(data)
}

/// Parse a hex quantity or 32-byte word returned by a node
///
/// An empty `0x` result, which nodes return for calls to addresses without
/// code, reads as zero.
pub fn parse_quantity(raw: &str) -> ServerResult<U256> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ServerError::InvalidRpcResult {
            message: format!("expected 0x-prefixed hex, got '{raw}'"),
        })?;

    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 16).map_err(|e| ServerError::InvalidRpcResult {
        message: format!("'{raw}' is not a 256-bit hex number: {e}"),
    })
}
