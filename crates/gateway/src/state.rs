// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! Shared application state: configuration, one endpoint registry per chain,
//! the explorer client, and the cancellation token for coordinated shutdown.

use std::{collections::HashMap, sync::Arc};

use endpoint_registry::{EndpointRegistry, EndpointStatus, JsonRpcCaller, JsonRpcProbe};
use explorer_client::{CacheKey, CacheStats, ExplorerClient};
use serde::{Deserialize, Serialize};
use shared_types::ChainId;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    config::{Environment, GatewayConfig},
    error::{ServerError, ServerResult},
    metrics,
    onchain::OnChainReader,
};

/// Endpoint registry as used by the gateway
pub type ChainRegistry = EndpointRegistry<JsonRpcProbe>;

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    config: Arc<GatewayConfig>,
    bsc: Arc<ChainRegistry>,
    solana: Arc<ChainRegistry>,
    explorer: Arc<ExplorerClient>,
    rpc: Arc<JsonRpcCaller>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Build the explorer client and start probing every configured chain
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if a client cannot be built, or
    /// `ServerError::Registry` if an endpoint list is invalid.
    pub fn new(config: GatewayConfig, cancellation_token: CancellationToken) -> ServerResult<Self> {
        let explorer_config = config
            .explorer
            .client_config()
            .map_err(|e| ServerError::Config {
                message: e.to_string(),
            })?;
        let explorer = ExplorerClient::new(explorer_config).map_err(|e| ServerError::Config {
            message: e.to_string(),
        })?;

        let rpc = JsonRpcCaller::new(config.rpc_timeout()).map_err(|e| ServerError::Config {
            message: format!("failed to build RPC client: {e}"),
        })?;

        let bsc = Self::start_registry(&config, ChainId::Bsc)?;
        let solana = Self::start_registry(&config, ChainId::Solana)?;

        Ok(Self {
            config: Arc::new(config),
            bsc,
            solana,
            explorer: Arc::new(explorer),
            rpc: Arc::new(rpc),
            cancellation_token,
        })
    }

    fn start_registry(config: &GatewayConfig, chain: ChainId) -> ServerResult<Arc<ChainRegistry>> {
        let registry_config = config.chains.get(chain).registry_config(chain);
        let probe = JsonRpcProbe::new(chain.kind(), registry_config.probe_timeout).map_err(|e| {
            ServerError::Config {
                message: format!("failed to build {chain} probe client: {e}"),
            }
        })?;

        let registry = ChainRegistry::start(registry_config, probe)?;
        info!(chain = %chain, endpoints = registry.endpoint_count(), "Endpoint registry started");
        Ok(registry)
    }

    /// Server configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Endpoint registry for `chain`
    pub fn registry(&self, chain: ChainId) -> &Arc<ChainRegistry> {
        match chain {
            ChainId::Bsc => &self.bsc,
            ChainId::Solana => &self.solana,
        }
    }

    /// Explorer client
    pub fn explorer(&self) -> &ExplorerClient {
        &self.explorer
    }

    /// Direct EVM reads for BNB Smart Chain
    pub fn bsc_reader(&self) -> OnChainReader {
        OnChainReader::new(Arc::clone(&self.bsc), Arc::clone(&self.rpc))
    }

    /// Stop every background probe cycle
    pub fn stop_background_tasks(&self) {
        for &chain in ChainId::all() {
            self.registry(chain).cleanup();
        }
        info!("Endpoint probing stopped");
    }

    /// Copy registry and cache state into the exported gauges
    pub fn refresh_gauges(&self) {
        for &chain in ChainId::all() {
            metrics::set_healthy_endpoints(chain, self.registry(chain).healthy_count());
        }
        metrics::update_cache_metrics(&self.explorer.cache_stats());
        for action in CacheKey::ACTIONS {
            metrics::set_cache_hits(action, self.explorer.cache_hits_for_action(action));
        }
    }

    /// Aggregate endpoint health and cache state
    ///
    /// Reads the registries without selecting an endpoint, so a total outage
    /// is reported as such instead of triggering a health reset.
    pub fn health_check(&self) -> HealthCheck {
        let chains: HashMap<ChainId, ChainHealth> = ChainId::all()
            .iter()
            .map(|&chain| (chain, ChainHealth::from_registry(self.registry(chain))))
            .collect();

        let down: Vec<&str> = ChainId::all()
            .iter()
            .filter(|&&chain| chains[&chain].healthy_endpoints == 0)
            .map(|chain| chain.slug())
            .collect();

        let status = if down.is_empty() {
            HealthStatus::Up
        } else {
            HealthStatus::Degraded {
                reason: format!("no healthy endpoints for {}", down.join(", ")).into_boxed_str(),
            }
        };

        HealthCheck {
            status,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            chains,
            explorer_cache: self.explorer.cache_stats(),
        }
    }
}

/// Health status of a service or dependency
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HealthStatus {
    /// Service is fully operational and responding normally
    Up,

    /// Service is not operational or has critical failures
    Down {
        /// Human-readable explanation of why the service is down
        reason: Box<str>,
    },

    /// Service is operational but experiencing performance issues or partial failures
    Degraded {
        /// Human-readable explanation of the degradation condition
        reason: Box<str>,
    },
}

/// Endpoint health of one chain
#[derive(Debug, Serialize, Deserialize)]
pub struct ChainHealth {
    /// `Up` when at least one endpoint is healthy
    pub status: HealthStatus,
    /// Number of healthy endpoints
    pub healthy_endpoints: usize,
    /// Number of configured endpoints
    pub total_endpoints: usize,
    /// Per-endpoint detail
    pub endpoints: Vec<EndpointStatus>,
}

impl ChainHealth {
    fn from_registry(registry: &ChainRegistry) -> Self {
        let endpoints = registry.snapshot();
        let healthy_endpoints = endpoints.iter().filter(|e| e.is_healthy).count();
        let status = if healthy_endpoints == 0 {
            HealthStatus::Down {
                reason: Box::from("all endpoints failing probes"),
            }
        } else {
            HealthStatus::Up
        };

        Self {
            status,
            healthy_endpoints,
            total_endpoints: endpoints.len(),
            endpoints,
        }
    }
}

/// Health check status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Service status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Endpoint health per chain
    pub chains: HashMap<ChainId, ChainHealth>,
    /// Explorer response cache statistics
    pub explorer_cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> GatewayConfig {
        let mut config = GatewayConfig::for_testing();
        // Nothing listens on port 9; probes fail fast with connection refused
        config.chains.bsc.endpoints = vec!["http://127.0.0.1:9".to_string()];
        config.chains.solana.endpoints = vec!["http://127.0.0.1:9".to_string()];
        config.chains.bsc.probe_interval_seconds = 3600;
        config.chains.solana.probe_interval_seconds = 3600;
        config
    }

    #[tokio::test]
    async fn server_state_creation() {
        let state = ServerState::new(offline_config(), CancellationToken::new()).unwrap();

        assert!(!state.cancellation_token.is_cancelled());
        assert!(state.registry(ChainId::Bsc).is_running());
        assert_eq!(state.registry(ChainId::Solana).chain(), ChainId::Solana);
        assert_eq!(state.bsc_reader().chain(), ChainId::Bsc);
    }

    #[tokio::test]
    async fn stop_background_tasks_stops_every_registry() {
        let state = ServerState::new(offline_config(), CancellationToken::new()).unwrap();

        state.stop_background_tasks();

        assert!(!state.registry(ChainId::Bsc).is_running());
        assert!(!state.registry(ChainId::Solana).is_running());
    }

    #[tokio::test]
    async fn health_reports_every_chain() {
        let state = ServerState::new(offline_config(), CancellationToken::new()).unwrap();
        state.stop_background_tasks();

        let health = state.health_check();
        assert_eq!(health.environment, Environment::Testing);
        assert_eq!(health.chains.len(), 2);
        assert_eq!(health.chains[&ChainId::Bsc].total_endpoints, 1);
    }

    #[tokio::test]
    async fn missing_api_key_is_a_config_error() {
        let mut config = offline_config();
        config.explorer.api_key = String::new();

        let err = ServerState::new(config, CancellationToken::new()).unwrap_err();
        assert!(matches!(err, ServerError::Config { .. }));
    }
}
