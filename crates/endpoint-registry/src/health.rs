// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Per-endpoint health records and registry configuration

use std::{collections::HashSet, time::Duration};

// Health check constants
const DEFAULT_PROBE_TIMEOUT_SECONDS: u64 = 5;
const DEFAULT_PROBE_INTERVAL_SECONDS: u64 = 30;
const DEFAULT_MAX_FAIL_COUNT: u32 = 3;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::ChainId;

use crate::RegistryError;

/// Mutable health state of a single endpoint
///
/// Invariant: `is_healthy` is false whenever `consecutive_failures` has reached
/// the registry's `max_fail_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointHealth {
    /// Round-trip time of the last successful probe
    pub latency: Duration,
    /// When the endpoint was last probed, `None` until the first probe completes
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Whether the endpoint is eligible for selection
    pub is_healthy: bool,
    /// Failed probes since the last success
    pub consecutive_failures: u32,
}

impl Default for EndpointHealth {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            last_checked_at: None,
            is_healthy: true,
            consecutive_failures: 0,
        }
    }
}

impl EndpointHealth {
    /// Apply a successful probe
    pub fn record_success(&mut self, latency: Duration, checked_at: DateTime<Utc>) {
        self.latency = latency;
        self.last_checked_at = Some(checked_at);
        self.is_healthy = true;
        self.consecutive_failures = 0;
    }

    /// Apply a failed probe
    ///
    /// Health is recomputed from the counter, so an endpoint with a clean
    /// history survives a single failure.
    pub fn record_failure(&mut self, max_fail_count: u32, checked_at: DateTime<Utc>) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_checked_at = Some(checked_at);
        self.is_healthy = self.consecutive_failures < max_fail_count;
    }

    /// Clear all failure state
    pub fn grant_amnesty(&mut self) {
        self.consecutive_failures = 0;
        self.is_healthy = true;
    }
}

/// Serializable view of one endpoint, as reported by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStatus {
    /// Endpoint URL
    pub url: String,
    /// Latency of the last successful probe in milliseconds
    pub latency_ms: u64,
    /// When the endpoint was last probed
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Whether the endpoint is eligible for selection
    pub is_healthy: bool,
    /// Failed probes since the last success
    pub consecutive_failures: u32,
}

impl EndpointStatus {
    /// Build a status view from a URL and its health record
    pub fn new(url: &str, health: &EndpointHealth) -> Self {
        Self {
            url: url.to_string(),
            latency_ms: u64::try_from(health.latency.as_millis()).unwrap_or(u64::MAX),
            last_checked_at: health.last_checked_at,
            is_healthy: health.is_healthy,
            consecutive_failures: health.consecutive_failures,
        }
    }
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Chain the endpoints belong to
    pub chain: ChainId,
    /// Candidate endpoint URLs in preference order
    pub endpoints: Vec<String>,
    /// Consecutive failures after which an endpoint is marked unhealthy
    pub max_fail_count: u32,
    /// Period of the background probe cycle
    pub probe_interval: Duration,
    /// Upper bound on a single probe
    pub probe_timeout: Duration,
}

impl RegistryConfig {
    /// Configuration with default thresholds for the given endpoints
    pub fn new(chain: ChainId, endpoints: Vec<String>) -> Self {
        Self {
            chain,
            endpoints,
            max_fail_count: DEFAULT_MAX_FAIL_COUNT,
            probe_interval: Duration::from_secs(DEFAULT_PROBE_INTERVAL_SECONDS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECONDS),
        }
    }

    /// Configuration using the chain's public default endpoints
    pub fn for_chain(chain: ChainId) -> Self {
        Self::new(chain, chain.default_endpoints())
    }

    /// Override the failure threshold
    #[must_use]
    pub fn with_max_fail_count(mut self, max_fail_count: u32) -> Self {
        self.max_fail_count = max_fail_count;
        self
    }

    /// Override the probe period
    #[must_use]
    pub fn with_probe_interval(mut self, probe_interval: Duration) -> Self {
        self.probe_interval = probe_interval;
        self
    }

    /// Override the probe timeout
    #[must_use]
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Check the configuration before a registry is built from it
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.endpoints.is_empty() {
            return Err(RegistryError::NoEndpoints {
                chain: self.chain.to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(self.endpoints.len());
        for url in &self.endpoints {
            if !seen.insert(url.as_str()) {
                return Err(RegistryError::DuplicateEndpoint { url: url.clone() });
            }
        }

        if self.max_fail_count == 0 {
            return Err(RegistryError::InvalidConfig {
                message: "max_fail_count must be at least 1".to_string(),
            });
        }
        if self.probe_interval.is_zero() {
            return Err(RegistryError::InvalidConfig {
                message: "probe_interval must be greater than zero".to_string(),
            });
        }
        if self.probe_timeout.is_zero() {
            return Err(RegistryError::InvalidConfig {
                message: "probe_timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
