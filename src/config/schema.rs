//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site API.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the site API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Blog feed and cache settings.
    pub blog: BlogConfig,

    /// Per-form request quotas.
    pub rate_limits: RateLimitsConfig,

    /// Request guard settings.
    pub security: SecurityConfig,

    /// Form processing settings.
    pub forms: FormsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Blog cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Upstream RSS feed URL.
    pub feed_url: String,

    /// How long a fetched post list stays fresh, in seconds.
    pub ttl_secs: u64,

    /// Upper bound for a single upstream fetch, in seconds.
    pub fetch_timeout_secs: u64,

    /// Frontend endpoint notified after a manual refresh.
    pub revalidate_webhook: Option<String>,

    /// Paths sent to the revalidation webhook.
    pub revalidate_paths: Vec<String>,
}

impl BlogConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            ttl_secs: 3600,
            fetch_timeout_secs: 10,
            revalidate_webhook: None,
            revalidate_paths: vec![
                "/".to_string(),
                "/blog".to_string(),
                "/sitemap.xml".to_string(),
            ],
        }
    }
}

/// A fixed-window request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitQuota {
    /// Requests allowed per window.
    pub max_requests: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl RateLimitQuota {
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

/// Rate limiting configuration, one quota per form class.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitsConfig {
    pub contact: RateLimitQuota,
    pub search: RateLimitQuota,
    pub home_value: RateLimitQuota,

    /// How often expired counters are dropped, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            contact: RateLimitQuota::new(5, 60_000),
            search: RateLimitQuota::new(30, 60_000),
            home_value: RateLimitQuota::new(3, 3_600_000),
            sweep_interval_secs: 300,
        }
    }
}

/// Request guard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Bearer secret for the blog sync endpoint. Unset disables auth.
    pub revalidate_secret: Option<String>,

    /// Public site URL, used to classify outbound links.
    pub site_url: String,

    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Enable security response headers.
    pub enable_headers: bool,

    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    /// Only safe behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            revalidate_secret: None,
            site_url: "http://localhost:3000".to_string(),
            max_body_size: 64 * 1024,
            enable_headers: true,
            trust_proxy_headers: false,
        }
    }
}

/// Form handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Simulated processing time for accepted submissions.
    pub processing_delay_ms: u64,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: 1000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
