// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Chain Gateway Server Implementation
//!
//! HTTP gateway over BNB Smart Chain and Solana data sources, built with Axum.
//! It keeps a health-ranked pool of RPC endpoints per chain and fronts the
//! block explorer with a rate-limited, cached client.
//!
//! # Module Structure
//!
//! - [`config`]: Gateway configuration with hierarchical loading
//! - [`error`]: Error types and HTTP response mapping
//! - [`state`]: Shared state: registries, explorer client, cancellation
//! - [`server`]: Server lifecycle and coordinated shutdown
//! - [`routes`]: Route table and request handlers
//! - [`balances`]: Token balances with explorer-to-node fallback
//! - [`deposits`]: Incubator deposit aggregation and history filtering
//! - [`onchain`]: Direct node reads with endpoint failover
//! - [`params`]: Path and query validation
//! - [`metrics`]: Prometheus metrics and the `/metrics` handler

pub mod balances;
pub mod config;
pub mod deposits;
pub mod error;
pub mod metrics;
pub mod onchain;
pub mod params;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, GatewayConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use shared_types::ChainId;
pub use state::{HealthCheck, HealthStatus, ServerState};
