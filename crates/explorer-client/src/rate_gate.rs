// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Minimum-spacing admission gate for outbound requests

use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};
use tracing::trace;

/// Spaces physical requests at least `min_interval` apart
///
/// The lock is held across the wait, so computing the delay and recording the
/// new request time is one atomic step. Concurrent callers queue on the lock
/// in arrival order and are admitted one interval apart.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_request_at: Mutex<Option<Instant>>,
}

impl RateGate {
    /// Create a gate that has not admitted any request yet
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request_at: Mutex::new(None),
        }
    }

    /// Wait until a request may be issued and record it as issued
    ///
    /// Returns how long the caller was held back.
    pub async fn admit(&self) -> Duration {
        let mut last_request_at = self.last_request_at.lock().await;

        let wait = last_request_at
            .map(|last| self.min_interval.saturating_sub(last.elapsed()))
            .unwrap_or_default();

        if !wait.is_zero() {
            trace!(wait_ms = wait.as_millis(), "rate gate delaying request");
            tokio::time::sleep(wait).await;
        }

        *last_request_at = Some(Instant::now());
        wait
    }

    /// Configured minimum spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
