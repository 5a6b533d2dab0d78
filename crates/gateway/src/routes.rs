// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! Route table for the gateway. Operational endpoints sit at the root; data
//! endpoints are versioned under `/v1`.

pub mod handlers;

use axum::{Router, routing::get};
use handlers::{
    balances_handler, deposits_handler, endpoints_handler, fastest_endpoint_handler,
    health_handler, incubator_transactions_handler, next_endpoint_handler,
    receipt_status_handler, token_transfers_handler, transactions_handler,
};

use crate::{metrics::metrics_handler, state::ServerState};

/// Create application routes
pub fn create_routes() -> Router<ServerState> {
    let ops_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    let endpoint_routes = Router::new()
        .route("/chains/{chain}/endpoints", get(endpoints_handler))
        .route("/chains/{chain}/endpoints/fastest", get(fastest_endpoint_handler))
        .route("/chains/{chain}/endpoints/next", get(next_endpoint_handler));

    let bsc_routes = Router::new()
        .route("/accounts/{address}/transactions", get(transactions_handler))
        .route(
            "/accounts/{address}/token-transfers/{contract}",
            get(token_transfers_handler),
        )
        .route("/accounts/{address}/balances", get(balances_handler))
        .route("/accounts/{address}/deposits", get(deposits_handler))
        .route(
            "/accounts/{address}/incubator-transactions",
            get(incubator_transactions_handler),
        )
        .route("/transactions/{hash}/receipt-status", get(receipt_status_handler));

    let v1 = Router::new().nest("/v1", endpoint_routes.nest("/bsc", bsc_routes));

    Router::new().merge(ops_routes).merge(v1)
}
