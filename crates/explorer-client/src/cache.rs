// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Response cache for explorer queries
//!
//! Entries hold the explorer's `result` payload exactly as received. Expiry is
//! lazy: a stale entry is dropped when it is looked up, or in bulk when the
//! cache nears capacity. At capacity the least recently used entry is evicted.

use std::{fmt, time::Duration};

use alloy_primitives::{Address, B256};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::{TokenTransferQuery, TxListQuery};

/// Identity of a cached explorer query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CacheKey {
    /// `transaction/gettxreceiptstatus`
    ReceiptStatus { tx_hash: B256 },
    /// `account/txlist` with explicit paging
    TransactionHistory { address: Address, query: TxListQuery },
    /// `account/tokentx`
    TokenTransfers {
        address: Address,
        contract: Address,
        query: TokenTransferQuery,
    },
    /// `account/tokenbalance`
    TokenBalance { address: Address, contract: Address },
    /// `account/txlist` with an optional counterparty filter
    NormalTransactions {
        address: Address,
        counterparty: Option<Address>,
    },
}

impl CacheKey {
    /// Every explorer action with cached responses
    pub const ACTIONS: [&'static str; 4] =
        ["gettxreceiptstatus", "txlist", "tokentx", "tokenbalance"];

    /// Explorer `module` parameter of the query
    pub fn module(&self) -> &'static str {
        match self {
            Self::ReceiptStatus { .. } => "transaction",
            _ => "account",
        }
    }

    /// Explorer `action` parameter of the query
    pub fn action(&self) -> &'static str {
        match self {
            Self::ReceiptStatus { .. } => "gettxreceiptstatus",
            Self::TransactionHistory { .. } | Self::NormalTransactions { .. } => "txlist",
            Self::TokenTransfers { .. } => "tokentx",
            Self::TokenBalance { .. } => "tokenbalance",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-", self.module(), self.action())?;
        match self {
            Self::ReceiptStatus { tx_hash } => write!(f, "{tx_hash}"),
            Self::TransactionHistory { address, query } => {
                write!(f, "{address}-{}", query.page)
            }
            Self::TokenTransfers {
                address,
                contract,
                query,
            } => write!(f, "{address}-{contract}-{}", query.page),
            Self::TokenBalance { address, contract } => write!(f, "{address}-{contract}"),
            Self::NormalTransactions {
                address,
                counterparty: Some(counterparty),
            } => write!(f, "{address}-{counterparty}"),
            Self::NormalTransactions {
                address,
                counterparty: None,
            } => write!(f, "{address}-all"),
        }
    }
}

/// A cached payload with access tracking
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// The explorer `result` payload
    pub value: Value,
    /// When the payload was stored
    pub cached_at: Instant,
    /// When the entry was last read or written
    pub last_accessed: Instant,
    /// How many times the entry has been read
    pub access_count: u64,
}

impl CachedResponse {
    fn new(value: Value) -> Self {
        let now = Instant::now();
        Self {
            value,
            cached_at: now,
            last_accessed: now,
            access_count: 0,
        }
    }

    /// Whether the entry is younger than `ttl`
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }

    fn accessed(&mut self) {
        self.access_count += 1;
        self.last_accessed = Instant::now();
    }
}

/// Bounded TTL cache keyed by [`CacheKey`]
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<CacheKey, CachedResponse>,
    ttl: Duration,
    max_entries: usize,
    stats: DashMap<String, u64>,
}

impl ResponseCache {
    /// Create a cache with the given TTL and capacity
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
            stats: DashMap::new(),
        }
    }

    /// Look up a fresh payload, dropping the entry if it has expired
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        if let Some(mut cached) = self.entries.get_mut(key) {
            if cached.is_valid(self.ttl) {
                cached.accessed();
                self.increment_stat("cache_hits");
                self.increment_stat(&format!("cache_hits_{}", key.action()));
                trace!(key = %key, "cache hit");
                return Some(cached.value.clone());
            }
            drop(cached);
            self.entries.remove(key);
            self.increment_stat("cache_expired");
            debug!(key = %key, "expired cache entry removed");
        }

        self.increment_stat("cache_misses");
        None
    }

    /// Store a payload, replacing any previous entry for the key
    pub fn store(&self, key: &CacheKey, value: Value) {
        let current_size = self.entries.len();
        // Start sweeping expired entries at 90% of capacity.
        let sweep_threshold = self.max_entries - self.max_entries / 10;

        if !self.entries.contains_key(key) {
            if current_size >= self.max_entries {
                self.cleanup_expired();
                if self.entries.len() >= self.max_entries {
                    self.evict_least_recently_used();
                }
            } else if current_size >= sweep_threshold {
                self.cleanup_expired();
            }
        }

        self.entries.insert(key.clone(), CachedResponse::new(value));
        self.increment_stat("cache_stores");

        trace!(
            key = %key,
            size = self.entries.len(),
            capacity = self.max_entries,
            "stored explorer response in cache"
        );
    }

    fn evict_least_recently_used(&self) {
        let lru_key = self
            .entries
            .iter()
            .min_by_key(|item| (item.value().last_accessed, item.value().access_count))
            .map(|item| item.key().clone());

        if let Some(key) = lru_key
            && let Some((_, entry)) = self.entries.remove(&key)
        {
            self.increment_stat("cache_evictions");
            info!(
                key = %key,
                access_count = entry.access_count,
                age_ms = entry.cached_at.elapsed().as_millis(),
                remaining_entries = self.entries.len(),
                "evicted lru cache entry due to capacity limit"
            );
        }
    }

    /// Remove every expired entry, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, cached| cached.is_valid(self.ttl));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            self.add_stat("cache_expired", removed as u64);
            debug!(removed, remaining = self.entries.len(), "cleaned up expired cache entries");
        }

        removed
    }

    /// Remove all entries and reset statistics
    pub fn clear(&self) {
        self.entries.clear();
        self.stats.clear();
        debug!("cleared explorer response cache");
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of cache statistics
    pub fn stats(&self) -> CacheStats {
        let cache_hits = self.get_stat("cache_hits");
        let cache_misses = self.get_stat("cache_misses");
        let total_lookups = cache_hits + cache_misses;
        #[allow(clippy::cast_precision_loss)]
        let hit_rate = if total_lookups > 0 {
            cache_hits as f64 / total_lookups as f64
        } else {
            0.0
        };

        let entry_count = self.entries.len();
        #[allow(clippy::cast_precision_loss)]
        let utilization_rate = entry_count as f64 / self.max_entries as f64;

        CacheStats {
            entry_count,
            cache_hits,
            cache_misses,
            cache_stores: self.get_stat("cache_stores"),
            cache_evictions: self.get_stat("cache_evictions"),
            cache_expired: self.get_stat("cache_expired"),
            hit_rate,
            utilization_rate,
            max_capacity: self.max_entries,
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Hits recorded for one explorer action
    pub fn hits_for_action(&self, action: &str) -> u64 {
        self.get_stat(&format!("cache_hits_{action}"))
    }

    fn increment_stat(&self, key: &str) {
        self.add_stat(key, 1);
    }

    fn add_stat(&self, key: &str, amount: u64) {
        self.stats
            .entry(key.to_string())
            .and_modify(|v| *v += amount)
            .or_insert(amount);
    }

    fn get_stat(&self, key: &str) -> u64 {
        self.stats.get(key).map_or(0, |v| *v)
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of stored entries
    pub entry_count: usize,
    /// Lookups answered from the cache
    pub cache_hits: u64,
    /// Lookups that found nothing fresh
    pub cache_misses: u64,
    /// Payloads written
    pub cache_stores: u64,
    /// Entries evicted at capacity
    pub cache_evictions: u64,
    /// Entries dropped because they expired
    pub cache_expired: u64,
    /// Hit rate (0.0 to 1.0)
    pub hit_rate: f64,
    /// Fill level (0.0 to 1.0)
    pub utilization_rate: f64,
    /// Maximum number of entries
    pub max_capacity: usize,
    /// Entry lifetime in seconds
    pub ttl_seconds: u64,
}
