//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::SiteConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Env var holding the blog sync bearer secret.
pub const ENV_REVALIDATE_SECRET: &str = "REVALIDATE_SECRET";
/// Env var holding the public site URL.
pub const ENV_SITE_URL: &str = "NEXT_PUBLIC_SITE_URL";
/// Env var holding the upstream feed URL.
pub const ENV_FEED_URL: &str = "BLOG_FEED_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Apply environment overrides to a config and validate the result.
pub fn finalize(mut config: SiteConfig) -> Result<SiteConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Override config values from the environment. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut SiteConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(secret) = get(ENV_REVALIDATE_SECRET) {
        config.security.revalidate_secret = Some(secret);
    }
    if let Some(site_url) = get(ENV_SITE_URL) {
        config.security.site_url = site_url;
    }
    if let Some(feed_url) = get(ENV_FEED_URL) {
        config.blog.feed_url = feed_url;
    }
}
