// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Rate-limited, cached explorer client
//!
//! [`ExplorerClient`] is the single choke point for calls to one explorer API.
//! Typed queries consult the response cache first; on a miss the request
//! passes through the [`RateGate`] before it is sent, and the decoded payload is
//! cached on success.
//!
//! The client surfaces every failure to its caller and never retries. Callers
//! with an on-chain source of truth are expected to fall back to it.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, B256, U256};
use dashmap::DashMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::{sync::Mutex, time::timeout};
use tracing::{debug, warn};
use url::Url;

use crate::{
    CacheKey, CacheStats, Envelope, ExplorerError, NonEmptyString, RateGate, ReceiptStatus,
    ResponseCache, Result, TokenBalance, TokenTransfer, TokenTransferQuery, Transaction,
    TxListQuery,
    types::{DEFAULT_END_BLOCK, DEFAULT_PAGE_SIZE},
};

/// Public BscScan API endpoint
pub const BSCSCAN_API_URL: &str = "https://api.bscscan.com/api";

const DEFAULT_MIN_INTERVAL_SECONDS: u64 = 20;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 60;
const DEFAULT_MAX_CACHE_ENTRIES: usize = 10_000;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for the explorer client
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Explorer API endpoint, e.g. `https://api.bscscan.com/api`
    pub base_url: NonEmptyString,
    /// API key sent as the `apikey` query parameter
    pub api_key: NonEmptyString,
    /// Minimum spacing between physical requests
    pub min_interval: Duration,
    /// How long a successful response stays cached
    pub cache_ttl: Duration,
    /// Maximum number of cached responses
    pub max_cache_entries: usize,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl ExplorerConfig {
    /// Configuration with default spacing, TTL and capacity
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: NonEmptyString::new(base_url).map_err(ExplorerError::Config)?,
            api_key: NonEmptyString::new(api_key).map_err(ExplorerError::Config)?,
            min_interval: Duration::from_secs(DEFAULT_MIN_INTERVAL_SECONDS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            max_cache_entries: DEFAULT_MAX_CACHE_ENTRIES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        })
    }

    /// Configuration for the public BscScan API
    pub fn bscscan(api_key: impl Into<String>) -> Result<Self> {
        Self::new(BSCSCAN_API_URL, api_key)
    }

    /// Override the minimum request spacing
    #[must_use]
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Override the cache TTL
    #[must_use]
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Override the cache capacity
    #[must_use]
    pub fn with_max_cache_entries(mut self, max_cache_entries: usize) -> Self {
        self.max_cache_entries = max_cache_entries;
        self
    }

    /// Override the per-request timeout
    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Client for one Etherscan-style explorer API
#[derive(Debug)]
pub struct ExplorerClient {
    client: Client,
    base_url: Url,
    config: ExplorerConfig,
    cache: ResponseCache,
    gate: RateGate,
    in_flight: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl ExplorerClient {
    /// Create a new explorer client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not a valid URL, the timeout is
    /// zero, or the HTTP client cannot be built
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.as_str())
            .map_err(|e| ExplorerError::Config(format!("invalid base URL: {e}")))?;

        if config.timeout_seconds == 0 {
            return Err(ExplorerError::Config(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("explorer-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ExplorerError::Http)?;

        Ok(Self {
            client,
            base_url,
            cache: ResponseCache::new(config.cache_ttl, config.max_cache_entries),
            gate: RateGate::new(config.min_interval),
            in_flight: DashMap::new(),
            config,
        })
    }

    /// Issue one rate-gated request and return the envelope's `result`
    ///
    /// The API key is appended to `params`. This bypasses the cache.
    ///
    /// # Errors
    ///
    /// Transport failures map to [`ExplorerError::Transport`],
    /// [`ExplorerError::Http`] or [`ExplorerError::Timeout`]; the explorer's
    /// `NOTOK` envelope maps to [`ExplorerError::Api`] carrying its `result`.
    pub async fn request(&self, params: &[(&str, String)]) -> Result<Value> {
        let waited = self.gate.admit().await;

        let mut query: Vec<(&str, &str)> = params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        query.push(("apikey", self.config.api_key.as_str()));

        debug!(
            params = ?params,
            waited_ms = waited.as_millis(),
            "sending explorer request"
        );

        let request = self.client.get(self.base_url.clone()).query(&query);
        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            request.send(),
        )
        .await
        .map_err(|_| self.timeout_error())?
        .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string();
            warn!(status = status.as_u16(), reason = %message, "explorer transport error");
            return Err(ExplorerError::Transport {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                ExplorerError::InvalidResponse {
                    message: e.to_string(),
                }
            }
        })?;

        if envelope.is_error() {
            let message = match envelope.result {
                Value::String(message) => message,
                other => other.to_string(),
            };
            warn!(reason = %message, "explorer reported an API error");
            return Err(ExplorerError::Api { message });
        }

        Ok(envelope.result)
    }

    /// Execution status of a transaction receipt
    pub async fn get_receipt_status(&self, tx_hash: B256) -> Result<ReceiptStatus> {
        self.cached(
            CacheKey::ReceiptStatus { tx_hash },
            vec![
                ("module", "transaction".to_string()),
                ("action", "gettxreceiptstatus".to_string()),
                ("txhash", tx_hash.to_string()),
            ],
        )
        .await
    }

    /// Normal transactions of `address`
    pub async fn get_transaction_history(
        &self,
        address: Address,
        query: TxListQuery,
    ) -> Result<Vec<Transaction>> {
        self.cached(
            CacheKey::TransactionHistory { address, query },
            vec![
                ("module", "account".to_string()),
                ("action", "txlist".to_string()),
                ("address", address.to_string()),
                ("startblock", query.start_block.to_string()),
                ("endblock", query.end_block.to_string()),
                ("page", query.page.to_string()),
                ("offset", query.offset.to_string()),
                ("sort", query.sort.to_string()),
            ],
        )
        .await
    }

    /// Transfers of token `contract` involving `address`
    pub async fn get_token_transfers(
        &self,
        address: Address,
        contract: Address,
        query: TokenTransferQuery,
    ) -> Result<Vec<TokenTransfer>> {
        self.cached(
            CacheKey::TokenTransfers {
                address,
                contract,
                query,
            },
            vec![
                ("module", "account".to_string()),
                ("action", "tokentx".to_string()),
                ("contractaddress", contract.to_string()),
                ("address", address.to_string()),
                ("startblock", query.start_block.to_string()),
                ("endblock", query.end_block.to_string()),
                ("page", query.page.to_string()),
                ("offset", query.offset.to_string()),
                ("sort", query.sort.to_string()),
            ],
        )
        .await
    }

    /// Latest balance of token `contract` held by `address`
    pub async fn get_token_balance(&self, address: Address, contract: Address) -> Result<U256> {
        let balance: TokenBalance = self
            .cached(
                CacheKey::TokenBalance { address, contract },
                vec![
                    ("module", "account".to_string()),
                    ("action", "tokenbalance".to_string()),
                    ("contractaddress", contract.to_string()),
                    ("address", address.to_string()),
                    ("tag", "latest".to_string()),
                ],
            )
            .await?;
        Ok(balance.0)
    }

    /// Latest page of normal transactions of `address`
    ///
    /// With a counterparty, the explorer is asked to constrain results to
    /// transactions addressed to it.
    pub async fn get_normal_transactions(
        &self,
        address: Address,
        counterparty: Option<Address>,
    ) -> Result<Vec<Transaction>> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", DEFAULT_END_BLOCK.to_string()),
            ("page", "1".to_string()),
            ("offset", DEFAULT_PAGE_SIZE.to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(counterparty) = counterparty {
            params.push(("toaddress", counterparty.to_string()));
        }

        self.cached(
            CacheKey::NormalTransactions {
                address,
                counterparty,
            },
            params,
        )
        .await
    }

    /// Cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Cache hits recorded for one explorer action, see [`CacheKey::ACTIONS`]
    pub fn cache_hits_for_action(&self, action: &str) -> u64 {
        self.cache.hits_for_action(action)
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop expired cached responses, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        self.cache.cleanup_expired()
    }

    /// Minimum spacing between physical requests
    pub fn min_interval(&self) -> Duration {
        self.gate.min_interval()
    }

    /// Serve `key` from the cache or fetch it once
    ///
    /// Concurrent misses on the same key queue on a per-key lock; only the
    /// first sends a request, the rest read what it stored.
    async fn cached<T>(&self, key: CacheKey, params: Vec<(&str, String)>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if let Some(value) = self.cache.get(&key) {
            debug!(key = %key, "serving explorer response from cache");
            return decode(&key, value);
        }

        let lock = Arc::clone(self.in_flight.entry(key.clone()).or_default().value());
        let result = {
            let _guard = lock.lock().await;
            self.fetch_on_miss(&key, &params).await
        };
        self.in_flight
            .remove_if(&key, |_, current| Arc::ptr_eq(current, &lock));
        result
    }

    async fn fetch_on_miss<T>(&self, key: &CacheKey, params: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if let Some(value) = self.cache.get(key) {
            debug!(key = %key, "explorer response stored by concurrent request");
            return decode(key, value);
        }

        let value = self.request(params).await?;
        let decoded = decode(key, value.clone())?;
        self.cache.store(key, value);
        Ok(decoded)
    }

    fn timeout_error(&self) -> ExplorerError {
        ExplorerError::Timeout {
            timeout_seconds: self.config.timeout_seconds,
        }
    }

    fn classify(&self, error: reqwest::Error) -> ExplorerError {
        if error.is_timeout() {
            self.timeout_error()
        } else {
            ExplorerError::Http(error)
        }
    }
}

fn decode<T: DeserializeOwned>(key: &CacheKey, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ExplorerError::InvalidResponse {
        message: format!("{key}: {e}"),
    })
}
