// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Blockchain chain types and identifiers
//!
//! The gateway reads from exactly two networks: BNB Smart Chain (EVM) and
//! Solana. Each chain knows which JSON-RPC dialect it speaks and which public
//! endpoints it falls back to when nothing is configured.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Public BNB Smart Chain RPC endpoints, in preference order
const BSC_DEFAULT_ENDPOINTS: &[&str] = &[
    "https://bsc-dataseed.binance.org",
    "https://bsc-dataseed1.defibit.io",
    "https://bsc-dataseed1.ninicoin.io",
];

/// Public Solana RPC endpoints, in preference order
const SOLANA_DEFAULT_ENDPOINTS: &[&str] = &[
    "https://api.mainnet-beta.solana.com",
    "https://solana-api.projectserum.com",
];

/// Family of JSON-RPC interface exposed by a chain's nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    /// Ethereum-compatible JSON-RPC (`eth_*` methods)
    Evm,
    /// Solana JSON-RPC
    Solana,
}

/// Supported blockchain chain identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainId {
    /// BNB Smart Chain mainnet - Chain ID: 56
    Bsc,
    /// Solana mainnet-beta
    Solana,
}

impl ChainId {
    /// Returns the numeric EVM chain ID, if the chain has one
    pub const fn evm_chain_id(self) -> Option<u64> {
        match self {
            Self::Bsc => Some(56),
            Self::Solana => None,
        }
    }

    /// Returns the human-readable name of the chain
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bsc => "BNB Smart Chain",
            Self::Solana => "Solana",
        }
    }

    /// Returns the short identifier used in configuration keys and URL paths
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Bsc => "bsc",
            Self::Solana => "solana",
        }
    }

    /// Returns the JSON-RPC family spoken by this chain's nodes
    pub const fn kind(self) -> ChainKind {
        match self {
            Self::Bsc => ChainKind::Evm,
            Self::Solana => ChainKind::Solana,
        }
    }

    /// Returns the public endpoints used when no endpoint list is configured
    pub fn default_endpoints(self) -> Vec<String> {
        let endpoints = match self {
            Self::Bsc => BSC_DEFAULT_ENDPOINTS,
            Self::Solana => SOLANA_DEFAULT_ENDPOINTS,
        };
        endpoints.iter().map(ToString::to_string).collect()
    }

    /// Returns all supported chains
    pub const fn all() -> &'static [Self] {
        &[Self::Bsc, Self::Solana]
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for ChainId {
    type Err = ChainIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<u64>() {
            return match id {
                56 => Ok(Self::Bsc),
                _ => Err(ChainIdParseError::InvalidId(id)),
            };
        }

        match s.to_lowercase().as_str() {
            "bsc" | "bnb" | "binance" => Ok(Self::Bsc),
            "solana" | "sol" => Ok(Self::Solana),
            _ => Err(ChainIdParseError::InvalidName(s.to_string())),
        }
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.slug())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::from_str(&value).map_err(serde::de::Error::custom)
    }
}

/// Error type for chain ID parsing
#[derive(Debug, thiserror::Error)]
pub enum ChainIdParseError {
    /// Invalid chain ID number
    #[error("unsupported chain ID: {0}. Supported chain IDs are: 56 (BNB Smart Chain)")]
    InvalidId(u64),
    /// Invalid chain name
    #[error("unsupported chain name: {0}. Supported chain names are: bsc, solana")]
    InvalidName(String),
}
