//! Fixed-spacing rate limiter for API requests
//!
//! The forum API enforces a flat requests-per-minute ceiling, so a minimum
//! gap between successive requests is sufficient.

use crate::config::CrawlerConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between successive external fetches
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
    requests: AtomicU64,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
            requests: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.request_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of fetches that have passed through the limiter
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Waits until a request may be sent, then records it
    ///
    /// The first call returns immediately.
    pub async fn throttle(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                tracing::trace!("Rate limiter sleeping {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}
