//! Blog post and cache result types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A post as read from the upstream feed. `slug` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub link: String,
    pub date: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub excerpt: String,
    pub author: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Posts served by [`BlogCache::get_posts`](crate::blog::BlogCache::get_posts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedPosts {
    pub posts: Vec<Post>,
    /// The last refresh attempt failed; `posts` may be stale or empty.
    pub degraded: bool,
}

/// Result of a manual refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub success: bool,
    pub posts_found: usize,
    pub new_posts: usize,
    pub last_sync: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub has_cache: bool,
    pub post_count: usize,
    pub is_expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

/// Errors that can occur while fetching posts upstream.
#[derive(Debug, Error)]
pub enum BlogError {
    /// Network or client error talking to the feed.
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Feed answered with a non-success status.
    #[error("feed returned status {0}")]
    Status(u16),

    /// Fetch exceeded the configured deadline.
    #[error("feed fetch timed out after {0:?}")]
    Timeout(Duration),

    /// Feed body was not a readable RSS document.
    #[error("feed parse error: {0}")]
    Parse(String),
}

pub type BlogResult<T> = Result<T, BlogError>;
