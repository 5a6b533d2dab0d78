// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Explorer client errors

use thiserror::Error;

/// Result type for explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Errors returned by [`crate::ExplorerClient`]
///
/// Transport failures (the request never produced a usable HTTP response) and
/// API failures (the explorer answered, but with its error envelope) are kept
/// apart so that callers can decide how to react to each. The client never
/// retries either kind.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ExplorerError {
    /// The explorer answered with a non-success HTTP status
    #[error("explorer returned HTTP {status}: {message}")]
    Transport { status: u16, message: String },

    /// Connection or protocol failure in the HTTP layer
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout
    #[error("explorer request timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// The explorer reported a failure in its response envelope
    #[error("explorer API error: {message}")]
    Api { message: String },

    /// The response could not be decoded into the expected shape
    #[error("invalid explorer response: {message}")]
    InvalidResponse { message: String },

    /// Client configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),
}

impl ExplorerError {
    /// Whether the request failed before a usable response was received
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Http(_) | Self::Timeout { .. }
        )
    }

    /// Whether the explorer itself reported the failure
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}
