// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Default JSON-RPC health probe

use std::{sync::Arc, time::Duration};

use serde_json::{Value, json};
use shared_types::ChainKind;

use crate::{JsonRpcCaller, Probe, ProbeError, RpcCallError};

/// Probes an endpoint by asking for the current chain height
///
/// EVM nodes are asked for `eth_blockNumber`, Solana nodes for `getSlot`. The
/// value itself is discarded; only success and timing matter.
#[derive(Debug, Clone)]
pub struct JsonRpcProbe {
    caller: Arc<JsonRpcCaller>,
    kind: ChainKind,
}

impl JsonRpcProbe {
    /// Create a probe with its own HTTP client
    pub fn new(kind: ChainKind, timeout: Duration) -> Result<Self, RpcCallError> {
        Ok(Self::with_caller(Arc::new(JsonRpcCaller::new(timeout)?), kind))
    }

    /// Create a probe sharing an existing caller
    pub fn with_caller(caller: Arc<JsonRpcCaller>, kind: ChainKind) -> Self {
        Self { caller, kind }
    }

    /// The JSON-RPC method used for probing
    pub const fn method(&self) -> &'static str {
        match self.kind {
            ChainKind::Evm => "eth_blockNumber",
            ChainKind::Solana => "getSlot",
        }
    }
}

impl Probe for JsonRpcProbe {
    async fn probe(&self, url: &str) -> Result<(), ProbeError> {
        self.caller
            .call::<Value>(url, self.method(), json!([]))
            .await?;
        Ok(())
    }
}
