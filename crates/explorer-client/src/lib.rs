// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Rate-limited, cached client for Etherscan-style block explorer APIs
//!
//! # Architecture
//!
//! - **Client**: [`client::ExplorerClient`] - typed queries plus the raw `request` primitive
//! - **Rate Gate**: [`rate_gate::RateGate`] - serialized admission with a minimum spacing
//! - **Cache**: [`cache::ResponseCache`] - bounded TTL cache keyed by [`cache::CacheKey`]
//! - **Validation Utilities**: [`non_empty_string::NonEmptyString`] - non-empty configuration values
//!
//! # Error Contract
//!
//! Transport failures and explorer-reported failures are distinct variants of
//! [`ExplorerError`]. Neither is retried inside the client.

pub mod cache;
pub mod client;
pub mod error;
pub mod non_empty_string;
pub mod rate_gate;
pub mod types;

pub use cache::{CacheKey, CacheStats, ResponseCache};
pub use client::{BSCSCAN_API_URL, ExplorerClient, ExplorerConfig};
pub use error::{ExplorerError, Result};
pub use non_empty_string::NonEmptyString;
pub use rate_gate::RateGate;
pub use types::*;
