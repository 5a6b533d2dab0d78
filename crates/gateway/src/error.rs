// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! [`ServerError`] covers both server lifecycle failures and request failures.
//! Request failures are rendered as JSON bodies with a status code chosen by
//! where the failure happened: bad input is the caller's fault, an explorer or
//! node failure is an upstream fault.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use endpoint_registry::{RegistryError, RpcCallError};
use explorer_client::ExplorerError;
use shared_types::ChainId;
use thiserror::Error;
use tracing::error;

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Task join errors for async operations
    #[error("Task join error: {source}")]
    TaskJoin {
        /// Underlying tokio join error
        #[source]
        source: tokio::task::JoinError,
    },

    /// Endpoint registry could not be built
    #[error("Endpoint registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The block explorer failed or rejected the request
    #[error(transparent)]
    Explorer(#[from] ExplorerError),

    /// A direct on-chain read failed on every endpoint tried
    #[error("RPC call to {chain} failed: {source}")]
    Rpc {
        /// Chain the call was made against
        chain: ChainId,
        /// Error from the last endpoint tried
        #[source]
        source: RpcCallError,
    },

    /// A node answered with data that could not be interpreted
    #[error("Unexpected RPC result: {message}")]
    InvalidRpcResult {
        /// What was wrong with the result
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Metrics could not be encoded
    #[error("Metrics encoding failed: {message}")]
    Metrics {
        /// Encoder error
        message: String,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status code reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Explorer(ExplorerError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Explorer(e) if e.is_transport() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Explorer(_) | Self::InvalidRpcResult { .. } => StatusCode::BAD_GATEWAY,
            Self::Rpc {
                source: RpcCallError::Timeout { .. },
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            Self::Rpc { .. } => StatusCode::BAD_GATEWAY,
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. }
            | Self::TaskJoin { .. }
            | Self::Registry(_)
            | Self::Metrics { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_request",
            Self::Explorer(e) if e.is_api() => "explorer_api_error",
            Self::Explorer(e) if e.is_transport() => "explorer_unavailable",
            Self::Explorer(_) => "explorer_invalid_response",
            Self::Rpc { .. } => "rpc_unavailable",
            Self::InvalidRpcResult { .. } => "rpc_invalid_result",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = Json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::TaskJoin { source }
    }
}
