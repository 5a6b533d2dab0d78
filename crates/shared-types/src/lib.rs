// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the chain data gateway
//!
//! This crate provides chain identifiers and token tables that are shared across
//! the registry, explorer and gateway crates, avoiding circular dependencies.

pub mod chains;
pub mod tokens;

pub use chains::{ChainId, ChainIdParseError, ChainKind};
pub use tokens::{TrackedToken, default_bsc_tokens};
