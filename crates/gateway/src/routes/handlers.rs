// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! Handlers validate path and query input, delegate to the registries or the
//! explorer, and map failures through [`ServerError`].

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use endpoint_registry::EndpointStatus;
use explorer_client::{TokenTransferQuery, TxListQuery};
use serde::{Deserialize, Serialize};
use shared_types::ChainId;
use tracing::warn;

use crate::{
    balances::balance_report,
    deposits::{deposit_summary, incubator_history},
    error::ServerError,
    metrics,
    params::{PageQuery, parse_address, parse_chain, parse_tx_hash},
    state::{HealthStatus, ServerState},
};

/// Health check endpoint handler
///
/// Always answers 200; a chain without healthy endpoints makes the body's
/// status `Degraded`.
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let health = state.health_check();
    if health.status != HealthStatus::Up {
        warn!(status = ?health.status, "Health check degraded");
    }
    Json(health)
}

/// Endpoint pool of one chain
#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointsResponse {
    /// Chain the pool belongs to
    pub chain: ChainId,
    /// Number of healthy endpoints
    pub healthy: usize,
    /// Per-endpoint health, in configured order
    pub endpoints: Vec<EndpointStatus>,
}

/// How a [`SelectedEndpoint`] was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Lowest measured latency among healthy endpoints
    Fastest,
    /// Next endpoint in rotation, ignoring health
    RoundRobin,
}

/// An endpoint picked by the registry
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectedEndpoint {
    /// Chain the endpoint belongs to
    pub chain: ChainId,
    /// Endpoint URL
    pub url: String,
    /// How it was chosen
    pub strategy: SelectionStrategy,
}

/// `GET /v1/chains/{chain}/endpoints`
pub async fn endpoints_handler(
    State(state): State<ServerState>,
    Path(chain): Path<String>,
) -> Result<Json<EndpointsResponse>, ServerError> {
    let chain = parse_chain(&chain)?;
    metrics::inc_requests_by_chain(chain);

    let registry = state.registry(chain);
    Ok(Json(EndpointsResponse {
        chain,
        healthy: registry.healthy_count(),
        endpoints: registry.snapshot(),
    }))
}

/// `GET /v1/chains/{chain}/endpoints/fastest`
pub async fn fastest_endpoint_handler(
    State(state): State<ServerState>,
    Path(chain): Path<String>,
) -> Result<Json<SelectedEndpoint>, ServerError> {
    let chain = parse_chain(&chain)?;
    metrics::inc_requests_by_chain(chain);

    Ok(Json(SelectedEndpoint {
        chain,
        url: state.registry(chain).get_fastest_healthy_rpc(),
        strategy: SelectionStrategy::Fastest,
    }))
}

/// `GET /v1/chains/{chain}/endpoints/next`
pub async fn next_endpoint_handler(
    State(state): State<ServerState>,
    Path(chain): Path<String>,
) -> Result<Json<SelectedEndpoint>, ServerError> {
    let chain = parse_chain(&chain)?;
    metrics::inc_requests_by_chain(chain);

    Ok(Json(SelectedEndpoint {
        chain,
        url: state.registry(chain).get_next_rpc(),
        strategy: SelectionStrategy::RoundRobin,
    }))
}

/// `GET /v1/bsc/accounts/{address}/transactions?page=`
pub async fn transactions_handler(
    State(state): State<ServerState>,
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let address = parse_address("address", &address)?;
    let page = query.page()?;
    metrics::inc_requests_by_chain(ChainId::Bsc);

    let result = state
        .explorer()
        .get_transaction_history(address, TxListQuery::page(page))
        .await;
    metrics::record_explorer_call("txlist", &result);
    Ok(Json(result?))
}

/// `GET /v1/bsc/accounts/{address}/token-transfers/{contract}?page=`
pub async fn token_transfers_handler(
    State(state): State<ServerState>,
    Path((address, contract)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let address = parse_address("address", &address)?;
    let contract = parse_address("contract", &contract)?;
    let page = query.page()?;
    metrics::inc_requests_by_chain(ChainId::Bsc);

    let result = state
        .explorer()
        .get_token_transfers(address, contract, TokenTransferQuery::page(page))
        .await;
    metrics::record_explorer_call("tokentx", &result);
    Ok(Json(result?))
}

/// `GET /v1/bsc/accounts/{address}/balances`
pub async fn balances_handler(
    State(state): State<ServerState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let address = parse_address("address", &address)?;
    metrics::inc_requests_by_chain(ChainId::Bsc);

    let report = balance_report(
        state.explorer(),
        &state.bsc_reader(),
        address,
        &state.config().incubator.tokens,
    )
    .await?;
    Ok(Json(report))
}

/// `GET /v1/bsc/accounts/{address}/deposits`
pub async fn deposits_handler(
    State(state): State<ServerState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let address = parse_address("address", &address)?;
    metrics::inc_requests_by_chain(ChainId::Bsc);

    let incubator = &state.config().incubator;
    let summary =
        deposit_summary(state.explorer(), address, incubator.wallet, &incubator.tokens).await?;
    Ok(Json(summary))
}

/// `GET /v1/bsc/accounts/{address}/incubator-transactions?page=`
pub async fn incubator_transactions_handler(
    State(state): State<ServerState>,
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let address = parse_address("address", &address)?;
    let page = query.page()?;
    metrics::inc_requests_by_chain(ChainId::Bsc);

    let result = state
        .explorer()
        .get_transaction_history(address, TxListQuery::page(page))
        .await;
    metrics::record_explorer_call("txlist", &result);

    let wallet = state.config().incubator.wallet;
    Ok(Json(incubator_history(result?, wallet)))
}

/// Receipt status of one transaction
#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptStatusResponse {
    /// Transaction hash
    pub hash: String,
    /// Raw explorer status: `"1"`, `"0"` or empty
    pub status: String,
    /// Whether the transaction executed successfully
    pub success: bool,
}

/// `GET /v1/bsc/transactions/{hash}/receipt-status`
pub async fn receipt_status_handler(
    State(state): State<ServerState>,
    Path(hash): Path<String>,
) -> Result<Json<ReceiptStatusResponse>, ServerError> {
    let tx_hash = parse_tx_hash(&hash)?;
    metrics::inc_requests_by_chain(ChainId::Bsc);

    let result = state.explorer().get_receipt_status(tx_hash).await;
    metrics::record_explorer_call("gettxreceiptstatus", &result);
    let receipt = result?;

    Ok(Json(ReceiptStatusResponse {
        hash: tx_hash.to_string(),
        success: receipt.is_success(),
        status: receipt.status,
    }))
}
