//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, pretty or JSON)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log collection
//!     → Prometheus scrape of observability.metrics_address
//! ```
//!
//! Request IDs come from the HTTP layer (`x-request-id`) and appear on the
//! `TraceLayer` spans.

pub mod logging;
pub mod metrics;
