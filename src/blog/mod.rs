//! Blog subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/blog/posts
//!     → cache.rs (fresh? serve : refresh)
//!         → source.rs (HTTP fetch, bounded by fetch timeout)
//!             → feed.rs (RSS → Vec<Post>)
//! POST /api/blog/sync
//!     → cache.rs refresh
//!     → revalidate.rs (notify front end)
//! ```

pub mod cache;
pub mod feed;
pub mod revalidate;
pub mod source;
pub mod types;

pub use cache::BlogCache;
pub use revalidate::Revalidator;
pub use source::{PostSource, RssFeedSource};
pub use types::{BlogError, BlogResult, CacheStatus, CachedPosts, Post, RefreshOutcome};
