// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Endpoint registry with background health probing
//!
//! The registry owns one [`EndpointHealth`] record per configured URL. Records
//! are created once at construction and never added or removed; only their
//! health attributes change. A background task re-probes every endpoint on a
//! fixed period until [`EndpointRegistry::cleanup`] is called or the registry
//! is dropped.

use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use dashmap::DashMap;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use shared_types::ChainId;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{EndpointHealth, EndpointStatus, Probe, ProbeError, RegistryConfig, RegistryError};

/// Outcome of one probe round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRoundSummary {
    /// Endpoints whose probe succeeded
    pub succeeded: usize,
    /// Endpoints whose probe failed or timed out
    pub failed: usize,
    /// Endpoints currently eligible for selection
    pub healthy: usize,
}

/// Ranks and serves RPC endpoints for one chain
#[derive(Debug)]
pub struct EndpointRegistry<P> {
    chain: ChainId,
    urls: Vec<String>,
    health: DashMap<String, EndpointHealth>,
    cursor: AtomicUsize,
    max_fail_count: u32,
    probe_interval: Duration,
    probe_timeout: Duration,
    probe: P,
    cancellation_token: CancellationToken,
    running: AtomicBool,
}

impl<P: Probe> EndpointRegistry<P> {
    /// Build a registry without starting the probe cycle
    ///
    /// Every endpoint starts healthy with zero latency and no failures.
    pub fn new(config: RegistryConfig, probe: P) -> Result<Self, RegistryError> {
        config.validate()?;

        let health = config
            .endpoints
            .iter()
            .map(|url| (url.clone(), EndpointHealth::default()))
            .collect();

        Ok(Self {
            chain: config.chain,
            urls: config.endpoints,
            health,
            cursor: AtomicUsize::new(0),
            max_fail_count: config.max_fail_count,
            probe_interval: config.probe_interval,
            probe_timeout: config.probe_timeout,
            probe,
            cancellation_token: CancellationToken::new(),
            running: AtomicBool::new(false),
        })
    }

    /// Build a registry and start its probe cycle
    ///
    /// The first round runs immediately, then one round per probe interval.
    /// Must be called from within a tokio runtime.
    pub fn start(config: RegistryConfig, probe: P) -> Result<Arc<Self>, RegistryError>
    where
        P: 'static,
    {
        let registry = Arc::new(Self::new(config, probe)?);
        Self::spawn_probe_cycle(&registry);
        Ok(registry)
    }

    fn spawn_probe_cycle(registry: &Arc<Self>)
    where
        P: 'static,
    {
        // The task only holds a weak reference so that dropping the last
        // handle also stops probing.
        let weak: Weak<Self> = Arc::downgrade(registry);
        let token = registry.cancellation_token.clone();
        let period = registry.probe_interval;
        let chain = registry.chain;

        registry.running.store(true, Ordering::SeqCst);
        info!(chain = %chain, endpoints = registry.urls.len(), interval = ?period, "Starting endpoint probe cycle");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some(registry) = weak.upgrade() else {
                    break;
                };

                tokio::select! {
                    () = token.cancelled() => break,
                    summary = registry.probe_all() => {
                        debug!(
                            chain = %chain,
                            succeeded = summary.succeeded,
                            failed = summary.failed,
                            healthy = summary.healthy,
                            "Probe round complete"
                        );
                        if summary.healthy == 0 {
                            warn!(chain = %chain, "No healthy endpoints after probe round");
                        }
                    }
                }
            }

            debug!(chain = %chain, "Endpoint probe cycle stopped");
        });
    }

    /// Probe every endpoint once, concurrently
    ///
    /// A slow or failing endpoint does not delay the others beyond the probe
    /// timeout, which bounds each probe individually.
    pub async fn probe_all(&self) -> ProbeRoundSummary {
        let outcomes = join_all(self.urls.iter().map(|url| self.probe_endpoint(url))).await;

        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        ProbeRoundSummary {
            succeeded,
            failed: outcomes.len() - succeeded,
            healthy: self.healthy_count(),
        }
    }

    async fn probe_endpoint(&self, url: &str) -> bool {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.probe_timeout, self.probe.probe(url)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                timeout: self.probe_timeout,
            }),
        };
        let elapsed = started.elapsed();

        let Some(mut entry) = self.health.get_mut(url) else {
            return false;
        };

        match result {
            Ok(()) => {
                entry.record_success(elapsed, Utc::now());
                debug!(chain = %self.chain, url = %url, latency_ms = elapsed.as_millis(), "Endpoint probe succeeded");
                true
            }
            Err(e) => {
                entry.record_failure(self.max_fail_count, Utc::now());
                if entry.is_healthy {
                    debug!(
                        chain = %self.chain,
                        url = %url,
                        consecutive_failures = entry.consecutive_failures,
                        error = %e,
                        "Endpoint probe failed"
                    );
                } else {
                    warn!(
                        chain = %self.chain,
                        url = %url,
                        consecutive_failures = entry.consecutive_failures,
                        error = %e,
                        "Endpoint marked unhealthy"
                    );
                }
                false
            }
        }
    }

    /// Return the healthy endpoint with the lowest probe latency
    ///
    /// Ties keep configured order. When no endpoint is healthy every record
    /// is reset to healthy with zero failures and the first configured URL is
    /// returned, so callers always receive an endpoint.
    pub fn get_fastest_healthy_rpc(&self) -> String {
        let fastest = self
            .urls
            .iter()
            .enumerate()
            .filter_map(|(index, url)| {
                self.health
                    .get(url)
                    .filter(|health| health.is_healthy)
                    .map(|health| (health.latency, index))
            })
            .min();

        if let Some((_, index)) = fastest {
            return self.urls[index].clone();
        }

        warn!(chain = %self.chain, "All endpoints unhealthy, resetting failure state");
        for mut entry in self.health.iter_mut() {
            entry.grant_amnesty();
        }

        // Construction rejects an empty endpoint list.
        self.urls[0].clone()
    }

    /// Return the next endpoint in round-robin order, ignoring health
    ///
    /// The cursor advances before reading, so the first call returns the
    /// second configured endpoint.
    pub fn get_next_rpc(&self) -> String {
        let len = self.urls.len();
        let previous = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cursor| {
                Some((cursor + 1) % len)
            })
            .unwrap_or_else(|cursor| cursor);

        self.urls[(previous + 1) % len].clone()
    }

    /// Stop the background probe cycle
    ///
    /// Safe to call any number of times.
    pub fn cleanup(&self) {
        if !self.cancellation_token.is_cancelled() {
            self.cancellation_token.cancel();
            if self.running.swap(false, Ordering::SeqCst) {
                info!(chain = %self.chain, "Stopped endpoint probe cycle");
            }
        }
    }

    /// Whether the background probe cycle is active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.cancellation_token.is_cancelled()
    }

    /// Status of every endpoint in configured order
    pub fn snapshot(&self) -> Vec<EndpointStatus> {
        self.urls
            .iter()
            .filter_map(|url| {
                self.health
                    .get(url)
                    .map(|health| EndpointStatus::new(url, &health))
            })
            .collect()
    }

    /// Health record of one endpoint
    pub fn status(&self, url: &str) -> Option<EndpointStatus> {
        self.health
            .get(url)
            .map(|health| EndpointStatus::new(url, &health))
    }

    /// Number of endpoints currently eligible for selection
    pub fn healthy_count(&self) -> usize {
        self.health
            .iter()
            .filter(|entry| entry.value().is_healthy)
            .count()
    }

    /// Number of configured endpoints
    pub fn endpoint_count(&self) -> usize {
        self.urls.len()
    }

    /// Configured endpoint URLs in preference order
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Chain served by this registry
    pub fn chain(&self) -> ChainId {
        self.chain
    }
}

impl<P> Drop for EndpointRegistry<P> {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
