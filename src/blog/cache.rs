//! Time-boxed in-memory cache of blog posts.
//!
//! # States
//! ```text
//! Empty (never synced) ──refresh──▶ Synced(posts, synced_at)
//! Synced ──ttl elapsed──▶ Expired ──get_posts──▶ refresh
//! any ──clear──▶ Empty
//! ```
//!
//! Refreshes are single flight: one upstream fetch at a time, and readers
//! that queued behind a fetch reuse its result.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::blog::source::PostSource;
use crate::blog::types::{BlogError, CacheStatus, CachedPosts, Post, RefreshOutcome};
use crate::observability::metrics;

#[derive(Default)]
struct CacheState {
    posts: Vec<Post>,
    /// Monotonic time of the last refresh attempt; drives expiry.
    synced_at: Option<Instant>,
    /// Wall-clock time of the last refresh attempt.
    last_sync: Option<DateTime<Utc>>,
    last_error: Option<String>,
    /// Bumped on every refresh attempt.
    generation: u64,
}

impl CacheState {
    fn is_expired(&self, ttl: Duration) -> bool {
        match self.synced_at {
            Some(at) => at.elapsed() > ttl,
            None => true,
        }
    }

    /// An empty set is never fresh, so reads keep retrying until some posts
    /// have been fetched.
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.posts.is_empty() && !self.is_expired(ttl)
    }

    fn snapshot(&self) -> CachedPosts {
        CachedPosts {
            posts: self.posts.clone(),
            degraded: self.last_error.is_some(),
        }
    }
}

/// Blog post cache in front of a [`PostSource`].
pub struct BlogCache {
    source: Arc<dyn PostSource>,
    ttl: Duration,
    fetch_timeout: Duration,
    state: RwLock<CacheState>,
    refresh_lock: Mutex<()>,
}

impl BlogCache {
    pub fn new(source: Arc<dyn PostSource>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            source,
            ttl,
            fetch_timeout,
            state: RwLock::new(CacheState::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached posts when present and fresh, otherwise refresh first.
    ///
    /// Upstream failures are not returned: the previous posts (possibly
    /// none) come back with `degraded` set.
    pub async fn get_posts(&self) -> CachedPosts {
        let seen_generation = {
            let state = self.state.read().await;
            if state.is_fresh(self.ttl) {
                return state.snapshot();
            }
            state.generation
        };

        let _flight = self.refresh_lock.lock().await;
        {
            let state = self.state.read().await;
            if state.generation != seen_generation || state.is_fresh(self.ttl) {
                return state.snapshot();
            }
        }

        self.refresh_locked().await;
        self.state.read().await.snapshot()
    }

    /// Fetch upstream now and replace the cached posts on success.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _flight = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Report cache contents without side effects.
    pub async fn status(&self) -> CacheStatus {
        let state = self.state.read().await;
        CacheStatus {
            has_cache: !state.posts.is_empty(),
            post_count: state.posts.len(),
            is_expired: state.is_expired(self.ttl),
            last_sync: state.last_sync,
        }
    }

    /// Drop everything and return to the never-synced state.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let generation = state.generation;
        *state = CacheState {
            generation,
            ..CacheState::default()
        };
        metrics::record_cached_posts(0);
        tracing::info!("Blog cache cleared");
    }

    /// Caller must hold `refresh_lock`.
    async fn refresh_locked(&self) -> RefreshOutcome {
        let started = Instant::now();
        let fetched = match tokio::time::timeout(self.fetch_timeout, self.source.fetch_posts()).await {
            Ok(result) => result,
            Err(_) => Err(BlogError::Timeout(self.fetch_timeout)),
        };

        let now = Utc::now();
        let mut state = self.state.write().await;
        state.generation += 1;
        state.synced_at = Some(Instant::now());
        state.last_sync = Some(now);

        match fetched {
            Ok(posts) => {
                let known: HashSet<&str> = state.posts.iter().map(|p| p.slug.as_str()).collect();
                let new_posts = posts
                    .iter()
                    .filter(|p| !known.contains(p.slug.as_str()))
                    .count();
                let posts_found = posts.len();

                state.posts = posts;
                state.last_error = None;

                metrics::record_blog_refresh(true);
                metrics::record_cached_posts(posts_found);
                tracing::info!(
                    posts_found,
                    new_posts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Blog cache refreshed"
                );

                RefreshOutcome {
                    success: true,
                    posts_found,
                    new_posts,
                    last_sync: now,
                    error: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                state.last_error = Some(message.clone());

                metrics::record_blog_refresh(false);
                tracing::warn!(
                    error = %message,
                    stale_posts = state.posts.len(),
                    "Blog refresh failed, keeping previous posts"
                );

                RefreshOutcome {
                    success: false,
                    posts_found: 0,
                    new_posts: 0,
                    last_sync: now,
                    error: Some(message),
                }
            }
        }
    }
}
