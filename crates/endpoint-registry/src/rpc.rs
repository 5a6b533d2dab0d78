// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Minimal JSON-RPC 2.0 client
//!
//! Connections are not pooled per endpoint: every call names the URL it goes
//! to, which is how callers switch endpoints after consulting the registry.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors from a single JSON-RPC call
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum RpcCallError {
    /// Connection or protocol failure in the HTTP layer
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered with a non-success HTTP status
    #[error("endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// The node answered with a JSON-RPC error object
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The body was not a usable JSON-RPC response
    #[error("invalid JSON-RPC response: {message}")]
    InvalidResponse { message: String },

    /// The request exceeded the client timeout
    #[error("request timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client shared by probes and direct on-chain reads
#[derive(Debug)]
pub struct JsonRpcCaller {
    client: reqwest::Client,
    timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcCaller {
    /// Create a caller whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, RpcCallError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("endpoint-registry/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Call `method` on the node at `url` and decode its `result`
    pub async fn call<T>(&self, url: &str, method: &str, params: Value) -> Result<T, RpcCallError>
    where
        T: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!(url = %url, method = %method, id = request.id, "Sending JSON-RPC request");

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcCallError::Status {
                status: status.as_u16(),
            });
        }

        let body: JsonRpcResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(e)
            } else {
                RpcCallError::InvalidResponse {
                    message: e.to_string(),
                }
            }
        })?;

        if let Some(error) = body.error {
            return Err(RpcCallError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = body.result.ok_or_else(|| RpcCallError::InvalidResponse {
            message: "response has neither result nor error".to_string(),
        })?;

        serde_json::from_value(result).map_err(|e| RpcCallError::InvalidResponse {
            message: e.to_string(),
        })
    }

    fn classify(&self, error: reqwest::Error) -> RpcCallError {
        if error.is_timeout() {
            RpcCallError::Timeout {
                timeout_seconds: self.timeout.as_secs(),
            }
        } else {
            RpcCallError::Http(error)
        }
    }
}
