// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serializing request rate limiter.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Runs queued operations one at a time, at most `requests_per_second` starts
/// per second.
///
/// The minimum gap is measured from the start of the previous operation.
/// Waiters queue on a fair mutex, so operations start in the order they were
/// enqueued. Failures are returned to the caller untouched; the limiter
/// never retries and cannot cancel an operation once it is queued.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// A rate of zero is treated as one request per second.
    pub fn new(requests_per_second: u32) -> Self {
        let rps = requests_per_second.max(1);
        Self {
            min_interval: Duration::from_millis(1000 / u64::from(rps)),
            last_start: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits for this caller's turn, then runs `operation` to completion.
    ///
    /// The queue position is held until the operation settles, so two
    /// operations never overlap inside the limiter.
    pub async fn enqueue<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "rate limiter delaying request"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_start = Some(Instant::now());
        operation().await
    }
}
