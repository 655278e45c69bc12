//! Real-estate site backend.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser / CMS webhook
//!            │
//!            ▼
//!     ┌─────────────┐   request id, trace, timeout, body limit, headers
//!     │ http server │──────────────────────────────────────────────┐
//!     └──────┬──────┘                                              │
//!            │                                                     │
//!     ┌──────┴───────────────┬──────────────────┐                  │
//!     ▼                      ▼                  ▼                  │
//! ┌─────────┐   ┌──────────────────────┐  ┌───────────┐            │
//! │  forms  │   │ blog sync / posts    │  │ telemetry │            │
//! └────┬────┘   └──────────┬───────────┘  └───────────┘            │
//!      │                   │                                       │
//!      ▼                   ▼                                       │
//! ┌──────────┐      ┌────────────┐     ┌──────────────┐            │
//! │ security │      │ blog cache │────▶│ RSS upstream │            │
//! │ guards   │      └────────────┘     └──────────────┘            │
//! └──────────┘                                                     │
//!                                                                  │
//!   Cross-cutting: config (+ hot reload), observability, lifecycle ┘
//! ```

use std::path::PathBuf;

use tokio::net::TcpListener;

use realty_site::config::loader::finalize;
use realty_site::config::watcher::ConfigWatcher;
use realty_site::config::{load_config, SiteConfig};
use realty_site::lifecycle::signals::spawn_signal_handler;
use realty_site::observability::{logging, metrics};
use realty_site::{Shutdown, SiteServer};

const CONFIG_PATH_ENV: &str = "SITE_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .map(PathBuf::from);

    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => finalize(SiteConfig::default())?,
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "realty-site starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        feed_url = %config.blog.feed_url,
        blog_ttl_secs = config.blog.ttl_secs,
        config_file = ?config_path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let (_config_watcher, config_updates) = match &config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = tokio::sync::mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = SiteServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
