//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! site.toml
//!     → loader.rs (parse, apply REVALIDATE_SECRET / NEXT_PUBLIC_SITE_URL / BLOG_FEED_URL)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → shared via ArcSwap in the HTTP state
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads and validates
//!     → server swaps the Arc<SiteConfig>
//! ```
//!
//! Listener, timeouts, body limit and blog settings are read once at
//! startup; quotas, secrets, the site URL, proxy-header trust and the form
//! delay follow reloads.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BlogConfig, FormsConfig, ListenerConfig, LogFormat, ObservabilityConfig, RateLimitQuota,
    RateLimitsConfig, SecurityConfig, SiteConfig, TimeoutConfig,
};
