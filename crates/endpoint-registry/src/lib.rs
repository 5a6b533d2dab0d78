// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Health-probing registry for blockchain RPC endpoints
//!
//! This crate keeps a fixed pool of candidate RPC endpoints for one chain under
//! continuous observation and hands out the best one to callers that build
//! per-call connections.
//!
//! # Core Abstractions
//!
//! - **`Probe` Trait**: a lightweight chain read used only to measure health and latency
//! - **`EndpointRegistry`**: probes every endpoint on a fixed period, ranks healthy
//!   endpoints by latency, and falls back to an amnesty reset when none is healthy
//! - **`JsonRpcProbe` / `JsonRpcCaller`**: the default probe and a minimal JSON-RPC
//!   client that higher layers reuse for direct on-chain reads
//!
//! # Failure Model
//!
//! Probe failures never reach callers. They only move the failure counter of the
//! endpoint that produced them, which in turn changes which URL
//! [`EndpointRegistry::get_fastest_healthy_rpc`] returns.

use std::time::Duration;

use thiserror::Error;

pub mod health;
pub mod probe;
pub mod registry;
pub mod rpc;

pub use health::*;
pub use probe::JsonRpcProbe;
pub use registry::{EndpointRegistry, ProbeRoundSummary};
pub use rpc::{JsonRpcCaller, RpcCallError};

/// A lightweight read used to check whether an endpoint is alive
///
/// Implementations perform exactly one cheap call against `url` (for example
/// "current block height"). The registry measures the elapsed time itself and
/// bounds every probe with its configured timeout, so implementations do not
/// need their own deadline.
pub trait Probe: Send + Sync {
    /// Probe the endpoint at `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint could not serve the read for any reason
    fn probe(&self, url: &str) -> impl Future<Output = Result<(), ProbeError>> + Send;
}

/// Reasons a single health probe can fail
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The underlying JSON-RPC call failed
    #[error(transparent)]
    Call(#[from] RpcCallError),

    /// The probe did not finish within the registry's probe timeout
    #[error("probe timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded
        timeout: Duration,
    },

    /// Probe-specific failure
    #[error("probe failed: {message}")]
    Other {
        /// Description of the failure
        message: String,
    },
}

/// Errors raised while constructing a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No endpoint URLs were configured
    #[error("no endpoints configured for {chain}")]
    NoEndpoints {
        /// Chain slug
        chain: String,
    },

    /// The same URL appears more than once in the endpoint list
    #[error("endpoint {url} is configured more than once")]
    DuplicateEndpoint {
        /// The repeated URL
        url: String,
    },

    /// A numeric setting is out of range
    #[error("invalid registry configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },
}
