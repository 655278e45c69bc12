//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse but make no
//! sense (zero windows, unusable URLs). Every problem is reported, not just
//! the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{RateLimitQuota, SiteConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if !is_http_url(&config.blog.feed_url) {
        errors.push(ValidationError::new(
            "blog.feed_url",
            "must be an absolute http(s) URL",
        ));
    }
    if config.blog.ttl_secs == 0 {
        errors.push(ValidationError::new("blog.ttl_secs", "must be greater than 0"));
    }
    if config.blog.fetch_timeout_secs == 0 {
        errors.push(ValidationError::new("blog.fetch_timeout_secs", "must be greater than 0"));
    }
    if let Some(webhook) = &config.blog.revalidate_webhook {
        if !is_http_url(webhook) {
            errors.push(ValidationError::new(
                "blog.revalidate_webhook",
                "must be an absolute http(s) URL",
            ));
        }
    }

    check_quota(&mut errors, "rate_limits.contact", &config.rate_limits.contact);
    check_quota(&mut errors, "rate_limits.search", &config.rate_limits.search);
    check_quota(&mut errors, "rate_limits.home_value", &config.rate_limits.home_value);
    if config.rate_limits.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limits.sweep_interval_secs",
            "must be greater than 0",
        ));
    }

    if !is_http_url(&config.security.site_url) {
        errors.push(ValidationError::new(
            "security.site_url",
            "must be an absolute http(s) URL",
        ));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_quota(errors: &mut Vec<ValidationError>, field: &str, quota: &RateLimitQuota) {
    if quota.max_requests == 0 {
        errors.push(ValidationError::new(
            format!("{field}.max_requests"),
            "must be greater than 0",
        ));
    }
    if quota.window_ms == 0 {
        errors.push(ValidationError::new(
            format!("{field}.window_ms"),
            "must be greater than 0",
        ));
    }
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
