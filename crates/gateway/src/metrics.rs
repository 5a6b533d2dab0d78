// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros and
//! an Axum-compatible metrics handler.

use std::sync::LazyLock;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use explorer_client::{CacheStats, ExplorerError};
use prometheus::{
    Encoder, Gauge, HistogramVec, IntCounterVec, IntGaugeVec, TextEncoder, register_gauge,
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec,
};
use shared_types::ChainId;

use crate::{error::ServerError, state::ServerState};

/// Total number of API requests received, labeled by chain.
pub static REQUESTS_BY_CHAIN: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "gateway_requests_total",
        "Total number of API requests, labeled by chain",
        &["chain"]
    )
    .expect("Failed to create gateway_requests_total counter vec")
});

/// Explorer calls made on behalf of API requests, by action and outcome.
pub static EXPLORER_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "gateway_explorer_requests_total",
        "Explorer calls, labeled by action and outcome",
        &["action", "outcome"]
    )
    .expect("Failed to create gateway_explorer_requests_total counter vec")
});

/// Direct on-chain read durations in seconds.
pub static RPC_CALL_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "gateway_rpc_call_duration",
        "Direct JSON-RPC call durations in seconds",
        &["chain", "method", "result"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create RPC call duration histogram")
});

/// Reads served from the chain after the explorer failed.
pub static ONCHAIN_FALLBACKS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "gateway_onchain_fallback_total",
        "Balance reads that fell back from the explorer to a node",
        &["chain", "result"]
    )
    .expect("Failed to create gateway_onchain_fallback_total counter vec")
});

/// Healthy endpoints per chain as of the last scrape.
pub static HEALTHY_ENDPOINTS: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    register_int_gauge_vec!(
        "gateway_healthy_endpoints",
        "Number of endpoints currently marked healthy",
        &["chain"]
    )
    .expect("Failed to create gateway_healthy_endpoints gauge vec")
});

/// Cache utilization gauge
pub static CACHE_UTILIZATION: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(
        "gateway_explorer_cache_utilization_ratio",
        "Current explorer cache utilization as a ratio (0.0 to 1.0)"
    )
    .expect("Failed to create cache utilization gauge")
});

/// Cache hit rate gauge
pub static CACHE_HIT_RATE: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(
        "gateway_explorer_cache_hit_rate",
        "Explorer cache hit rate as a ratio (0.0 to 1.0)"
    )
    .expect("Failed to create cache hit rate gauge")
});

/// Cache size gauge
pub static CACHE_SIZE: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(
        "gateway_explorer_cache_entries_count",
        "Current number of entries in the explorer cache"
    )
    .expect("Failed to create cache size gauge")
});

/// Cache hits per explorer action since the cache was last cleared
pub static CACHE_HITS_BY_ACTION: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    register_int_gauge_vec!(
        "gateway_explorer_cache_hits",
        "Explorer cache hits, labeled by action",
        &["action"]
    )
    .expect("Failed to create gateway_explorer_cache_hits gauge vec")
});

/// Increment the requests counter for `chain`
pub fn inc_requests_by_chain(chain: ChainId) {
    REQUESTS_BY_CHAIN.with_label_values(&[chain.slug()]).inc();
}

/// Record the outcome of one explorer call
pub fn record_explorer_call<T>(action: &str, result: &Result<T, ExplorerError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) if e.is_api() => "api_error",
        Err(e) if e.is_transport() => "transport_error",
        Err(_) => "invalid_response",
    };
    EXPLORER_REQUESTS
        .with_label_values(&[action, outcome])
        .inc();
}

/// Observe the duration of a direct on-chain read
pub fn observe_rpc_call(chain: ChainId, method: &str, result: &str, duration_secs: f64) {
    RPC_CALL_DURATION
        .with_label_values(&[chain.slug(), method, result])
        .observe(duration_secs);
}

/// Record an explorer-to-node fallback and whether the node answered
pub fn record_fallback(chain: ChainId, succeeded: bool) {
    let result = if succeeded { "success" } else { "failure" };
    ONCHAIN_FALLBACKS
        .with_label_values(&[chain.slug(), result])
        .inc();
}

/// Set the healthy endpoint gauge for `chain`
pub fn set_healthy_endpoints(chain: ChainId, healthy: usize) {
    HEALTHY_ENDPOINTS
        .with_label_values(&[chain.slug()])
        .set(i64::try_from(healthy).unwrap_or(i64::MAX));
}

/// Update cache gauges from a stats snapshot
pub fn update_cache_metrics(stats: &CacheStats) {
    CACHE_UTILIZATION.set(stats.utilization_rate);
    CACHE_HIT_RATE.set(stats.hit_rate);
    #[allow(clippy::cast_precision_loss)]
    CACHE_SIZE.set(stats.entry_count as f64);
}

/// Set the cache hit gauge for one explorer action
pub fn set_cache_hits(action: &str, hits: u64) {
    CACHE_HITS_BY_ACTION
        .with_label_values(&[action])
        .set(i64::try_from(hits).unwrap_or(i64::MAX));
}

/// Axum handler that exports metrics in Prometheus text format
///
/// Gauges that mirror registry and cache state are refreshed before encoding.
pub async fn metrics_handler(
    State(state): State<ServerState>,
) -> Result<Response<String>, ServerError> {
    state.refresh_gauges();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ServerError::Metrics {
            message: e.to_string(),
        })?;

    let body = String::from_utf8(buffer).map_err(|e| ServerError::Metrics {
        message: e.to_string(),
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(body)
        .map_err(|e| ServerError::Metrics {
            message: e.to_string(),
        })
}
