// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code, clippy::panic)]

//! Test harness for the gateway integration tests
//!
//! Each harness runs a gateway against wiremock stand-ins for two BNB Smart
//! Chain nodes, one Solana node and the block explorer.

use std::{net::SocketAddr, time::Duration};

use alloy_primitives::Address;
use gateway::{GatewayConfig, Server, ShutdownConfig};
use serde_json::{Value, json};
use shared_types::TrackedToken;
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

pub fn account() -> Address {
    Address::from([0x11; 20])
}

pub fn incubator() -> Address {
    Address::from([0x22; 20])
}

pub fn other() -> Address {
    Address::from([0x33; 20])
}

pub fn token() -> Address {
    Address::from([0x55; 20])
}

/// How the Solana stand-in answers probes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolanaNode {
    Healthy,
    Down,
}

pub struct Harness {
    pub addr: SocketAddr,
    pub token: CancellationToken,
    pub explorer: MockServer,
    pub bsc_nodes: [MockServer; 2],
    pub solana_node: MockServer,
    client: reqwest::Client,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with(SolanaNode::Healthy).await
    }

    pub async fn start_with(solana: SolanaNode) -> Self {
        let explorer = MockServer::start().await;
        let bsc_nodes = [rpc_node("eth_blockNumber").await, rpc_node("eth_blockNumber").await];
        let solana_node = match solana {
            SolanaNode::Healthy => rpc_node("getSlot").await,
            SolanaNode::Down => {
                let server = MockServer::start().await;
                Mock::given(method("POST"))
                    .respond_with(ResponseTemplate::new(503))
                    .mount(&server)
                    .await;
                server
            }
        };

        let mut config = GatewayConfig::for_testing();
        config.chains.bsc.endpoints = bsc_nodes.iter().map(MockServer::uri).collect();
        config.chains.bsc.probe_interval_seconds = 3600;
        config.chains.bsc.probe_timeout_seconds = 1;
        config.chains.solana.endpoints = vec![solana_node.uri()];
        config.chains.solana.max_fail_count = 1;
        config.chains.solana.probe_interval_seconds = 3600;
        config.chains.solana.probe_timeout_seconds = 1;
        config.explorer.base_url = format!("{}/api", explorer.uri());
        config.incubator.wallet = incubator();
        config.incubator.tokens = vec![TrackedToken::new("USDT", token(), 18)];

        let (addr, token) = Server::new(config, ShutdownConfig::default())
            .expect("Failed to create server")
            .run_for_testing()
            .await
            .expect("Failed to start test server");

        Self {
            addr,
            token,
            explorer,
            bsc_nodes,
            solana_node,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("http://{}{route}", self.addr)
    }

    pub async fn get(&self, route: &str) -> reqwest::Response {
        self.client
            .get(self.url(route))
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn get_json(&self, route: &str) -> (u16, Value) {
        let response = self.get(route).await;
        let status = response.status().as_u16();
        let body = response.json().await.expect("Response was not JSON");
        (status, body)
    }

    /// Poll `route` until `done` holds for its JSON body, or give up after five seconds
    pub async fn wait_for(&self, route: &str, done: impl Fn(&Value) -> bool) -> Value {
        for _ in 0..50 {
            let (_, body) = self.get_json(route).await;
            if done(&body) {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("condition on {route} not reached in time");
    }

    /// Answer explorer calls for `action` with `body`, expecting `times` requests
    pub async fn explorer_responds(&self, action: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", action))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.explorer)
            .await;
    }

    /// Answer `rpc_method` on every BNB Smart Chain node with `result`
    pub async fn nodes_respond(&self, rpc_method: &str, result: Value) {
        for node in &self.bsc_nodes {
            node_responds(node, rpc_method, result.clone()).await;
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn rpc_node(probe_method: &str) -> MockServer {
    let server = MockServer::start().await;
    node_responds(&server, probe_method, json!("0x2a")).await;
    server
}

pub async fn node_responds(node: &MockServer, rpc_method: &str, result: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": rpc_method})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result})),
        )
        .mount(node)
        .await;
}

pub async fn node_fails(node: &MockServer, rpc_method: &str, status: u16) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": rpc_method})))
        .respond_with(ResponseTemplate::new(status))
        .mount(node)
        .await;
}

pub fn ok(result: Value) -> Value {
    json!({"status": "1", "message": "OK", "result": result})
}

pub fn notok(detail: &str) -> Value {
    json!({"status": "0", "message": "NOTOK", "result": detail})
}

pub fn transaction(from: Address, to: Address, value: &str) -> Value {
    json!({
        "blockNumber": "38123456",
        "timeStamp": "1714000000",
        "hash": "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060",
        "from": from.to_string().to_lowercase(),
        "to": to.to_string().to_lowercase(),
        "value": value,
        "isError": "0",
        "txreceipt_status": "1"
    })
}

pub fn token_transfer(from: Address, to: Address, value: &str) -> Value {
    json!({
        "blockNumber": "38123460",
        "timeStamp": "1714000100",
        "hash": "0x0b5d5b6b4fbbd4dfe6b4b4f1c0b6a3b3a7f7d09d1f1e2c3b4a5968778695a4b3",
        "from": from.to_string().to_lowercase(),
        "contractAddress": token().to_string().to_lowercase(),
        "to": to.to_string().to_lowercase(),
        "value": value,
        "tokenSymbol": "USDT",
        "tokenDecimal": "18"
    })
}
