// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for `ExplorerClient`
//!
//! These tests use wiremock to stand in for the explorer API and check caching,
//! rate gating and error classification end to end.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{B256, U256};
use explorer_client::{
    ExplorerClient, ExplorerConfig, ExplorerError, SortOrder, TokenTransferQuery, TxListQuery,
};
use serde_json::json;
use tokio::time::Instant;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

mod fixtures;
use fixtures::*;

/// Create a client against the mock server with no request spacing
fn create_test_client(mock_server: &MockServer) -> ExplorerClient {
    create_spaced_client(mock_server, Duration::ZERO)
}

fn create_spaced_client(mock_server: &MockServer, min_interval: Duration) -> ExplorerClient {
    let config = ExplorerConfig::new(format!("{}/api", mock_server.uri()), TEST_API_KEY)
        .unwrap()
        .with_min_interval(min_interval)
        .with_timeout_seconds(5);
    ExplorerClient::new(config).unwrap()
}

#[tokio::test]
async fn token_balance_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("module", "account"))
        .and(query_param("action", "tokenbalance"))
        .and(query_param("contractaddress", token().to_string()))
        .and(query_param("address", account().to_string()))
        .and(query_param("tag", "latest"))
        .and(query_param("apikey", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!("2500000000000000000"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let balance = client.get_token_balance(account(), token()).await.unwrap();
    assert_eq!(balance, U256::from(2_500_000_000_000_000_000_u64));
}

#[tokio::test]
async fn notok_envelope_is_api_error_with_explorer_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(notok("Max rate limit reached")))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let error = client
        .get_token_balance(account(), token())
        .await
        .unwrap_err();

    assert!(error.is_api());
    assert!(!error.is_transport());
    match error {
        ExplorerError::Api { message } => assert_eq!(message, "Max rate limit reached"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_failure_is_transport_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let error = client
        .get_transaction_history(account(), TxListQuery::default())
        .await
        .unwrap_err();

    assert!(error.is_transport());
    assert!(matches!(
        error,
        ExplorerError::Transport { status: 500, ref message } if message == "Internal Server Error"
    ));
}

#[tokio::test]
async fn slow_explorer_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok(json!("1")))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = ExplorerConfig::new(format!("{}/api", mock_server.uri()), TEST_API_KEY)
        .unwrap()
        .with_min_interval(Duration::ZERO)
        .with_timeout_seconds(1);
    let client = ExplorerClient::new(config).unwrap();

    let error = client
        .get_token_balance(account(), token())
        .await
        .unwrap_err();
    assert!(matches!(error, ExplorerError::Timeout { timeout_seconds: 1 }));
    assert!(error.is_transport());
}

#[tokio::test]
async fn other_status_zero_envelopes_are_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "txlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(no_transactions()))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let transactions = client
        .get_transaction_history(account(), TxListQuery::default())
        .await
        .unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn identical_queries_within_ttl_hit_network_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "txlist"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok(json!([transaction(account(), incubator(), "1000")]))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let first = client
        .get_transaction_history(account(), TxListQuery::default())
        .await
        .unwrap();
    let second = client
        .get_transaction_history(account(), TxListQuery::default())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].value_wei(), Some(U256::from(1000_u64)));

    let stats = client.cache_stats();
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_stores, 1);
    assert_eq!(client.cache_hits_for_action("txlist"), 1);
    assert_eq!(client.cache_hits_for_action("tokenbalance"), 0);
}

#[tokio::test]
async fn concurrent_identical_queries_share_one_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "tokenbalance"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok(json!("42")))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let min_interval = Duration::from_secs(2);
    let client = create_spaced_client(&mock_server, min_interval);

    let started = Instant::now();
    let (first, second) = tokio::join!(
        client.get_token_balance(account(), token()),
        client.get_token_balance(account(), token()),
    );

    assert_eq!(first.unwrap(), U256::from(42_u64));
    assert_eq!(second.unwrap(), U256::from(42_u64));
    // The second caller never waited for a rate gate slot.
    assert!(started.elapsed() < min_interval);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_distinct_queries_each_send() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "tokenbalance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!("7"))))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let (first, second) = tokio::join!(
        client.get_token_balance(account(), token()),
        client.get_token_balance(incubator(), token()),
    );

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(client.cache_stats().entry_count, 2);
}

#[tokio::test]
async fn expired_entry_triggers_new_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "tokenbalance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!("42"))))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = ExplorerConfig::new(format!("{}/api", mock_server.uri()), TEST_API_KEY)
        .unwrap()
        .with_min_interval(Duration::ZERO)
        .with_cache_ttl(Duration::from_millis(200))
        .with_timeout_seconds(5);
    let client = ExplorerClient::new(config).unwrap();

    client.get_token_balance(account(), token()).await.unwrap();
    client.get_token_balance(account(), token()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    client.get_token_balance(account(), token()).await.unwrap();
}

#[tokio::test]
async fn errors_are_not_cached() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(notok("Invalid API Key")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    assert!(client.get_token_balance(account(), token()).await.is_err());
    assert!(client.get_token_balance(account(), token()).await.is_err());
    assert_eq!(client.cache_stats().entry_count, 0);
}

#[tokio::test]
async fn undecodable_payload_is_invalid_response_and_not_cached() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({"unexpected": true}))))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    for _ in 0..2 {
        let error = client
            .get_transaction_history(account(), TxListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(error, ExplorerError::InvalidResponse { .. }));
    }
}

#[tokio::test]
async fn counterparty_filter_is_passed_through() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "txlist"))
        .and(query_param("address", account().to_string()))
        .and(query_param("toaddress", incubator().to_string()))
        .and(query_param("sort", "desc"))
        .and(query_param("offset", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok(json!([transaction(account(), incubator(), "5")]))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let filtered = client
        .get_normal_transactions(account(), Some(incubator()))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert!(filtered[0].is_transfer(account(), incubator()));
}

#[tokio::test]
async fn unfiltered_and_filtered_queries_are_cached_separately() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "txlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(no_transactions()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    client
        .get_normal_transactions(account(), None)
        .await
        .unwrap();
    client
        .get_normal_transactions(account(), Some(incubator()))
        .await
        .unwrap();
    client
        .get_normal_transactions(account(), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn token_transfers_use_ascending_defaults() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "tokentx"))
        .and(query_param("contractaddress", token().to_string()))
        .and(query_param("startblock", "0"))
        .and(query_param("endblock", "999999999"))
        .and(query_param("page", "2"))
        .and(query_param("sort", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!([token_transfer(
            account(),
            incubator(),
            token(),
            "1500000000000000000"
        )]))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let query = TokenTransferQuery::page(2);
    assert_eq!(query.sort, SortOrder::Asc);

    let transfers = client
        .get_token_transfers(account(), token(), query)
        .await
        .unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].token_symbol, "USDT");
    assert_eq!(
        transfers[0].amount(),
        Some(U256::from(1_500_000_000_000_000_000_u64))
    );
}

#[tokio::test]
async fn receipt_status_query() {
    let mock_server = MockServer::start().await;
    let tx_hash = B256::repeat_byte(0xab);
    Mock::given(method("GET"))
        .and(query_param("module", "transaction"))
        .and(query_param("action", "gettxreceiptstatus"))
        .and(query_param("txhash", tx_hash.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({"status": "1"}))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let status = client.get_receipt_status(tx_hash).await.unwrap();
    assert!(status.is_success());
}

#[tokio::test]
async fn raw_request_returns_result_only() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("module", "stats"))
        .and(query_param("action", "bnbprice"))
        .and(query_param("apikey", TEST_API_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ok(json!({"ethbtc": "0.0081", "ethusd": "598.2"}))),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client
        .request(&[
            ("module", "stats".to_string()),
            ("action", "bnbprice".to_string()),
        ])
        .await
        .unwrap();
    assert_eq!(result["ethusd"], "598.2");
}

#[tokio::test]
async fn serialized_requests_respect_min_interval() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!("1"))))
        .expect(3)
        .mount(&mock_server)
        .await;

    let min_interval = Duration::from_millis(250);
    let client = create_spaced_client(&mock_server, min_interval);

    let started = Instant::now();
    for page in 1..=3 {
        client
            .request(&[("page", page.to_string())])
            .await
            .unwrap();
    }

    // Three requests need two full gaps.
    assert!(started.elapsed() >= min_interval * 2);
}

#[tokio::test]
async fn concurrent_requests_are_spaced() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!("1"))))
        .expect(4)
        .mount(&mock_server)
        .await;

    let min_interval = Duration::from_millis(200);
    let client = Arc::new(create_spaced_client(&mock_server, min_interval));

    let started = Instant::now();
    let handles: Vec<_> = (0..4)
        .map(|page| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .request(&[("page", page.to_string())])
                    .await
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(started.elapsed() >= min_interval * 3);
}

#[tokio::test]
async fn cache_maintenance() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!("7"))))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    client.get_token_balance(account(), token()).await.unwrap();
    assert_eq!(client.cache_stats().entry_count, 1);
    assert_eq!(client.cleanup_expired(), 0);

    client.clear_cache();
    assert_eq!(client.cache_stats().entry_count, 0);
    client.get_token_balance(account(), token()).await.unwrap();
}
