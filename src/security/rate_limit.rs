//! Fixed-window rate limiting for the public form endpoints.
//!
//! Time is cut into non-overlapping windows of `window_ms`. A counter lives
//! under `"{identifier}:{window index}"` and only counts requests inside
//! that window. Counters whose window has ended are treated as absent and
//! dropped by [`RateLimiter::sweep_expired`].

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::RateLimitQuota;

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u32,
    reset_at_ms: u64,
}

/// In-memory fixed-window limiter shared by all form handlers.
#[derive(Debug, Default)]
pub struct RateLimiter {
    counters: DashMap<String, Counter>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request for `identifier`. Returns false once the quota for
    /// the current window is used up.
    pub fn check(&self, identifier: &str, quota: &RateLimitQuota) -> bool {
        self.check_at(identifier, quota, now_ms())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&self, identifier: &str, quota: &RateLimitQuota, now_ms: u64) -> bool {
        let window_ms = quota.window_ms.max(1);
        let bucket = now_ms / window_ms;
        let key = format!("{identifier}:{bucket}");

        let mut entry = self.counters.entry(key).or_insert(Counter {
            count: 0,
            reset_at_ms: (bucket + 1) * window_ms,
        });

        if now_ms > entry.reset_at_ms {
            *entry = Counter {
                count: 0,
                reset_at_ms: (bucket + 1) * window_ms,
            };
        }

        if entry.count >= quota.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Drop counters whose window has ended. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(now_ms())
    }

    pub fn sweep_expired_at(&self, now_ms: u64) -> usize {
        let before = self.counters.len();
        self.counters.retain(|_, counter| counter.reset_at_ms > now_ms);
        before.saturating_sub(self.counters.len())
    }

    /// Number of live counters.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Periodically sweep expired counters until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep_expired();
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.len(), "Swept expired rate limit counters");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit sweeper stopping");
                    break;
                }
            }
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
