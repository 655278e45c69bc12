//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_form_submissions_total` (counter): submissions by form and outcome
//! - `site_rate_limited_total` (counter): rejected by the limiter, by form
//! - `site_blog_refresh_total` (counter): refresh attempts by outcome
//! - `site_blog_cached_posts` (gauge): posts currently cached
//! - `site_web_vitals` (histogram): reported web-vital values by metric name
//!   (known vitals only, anything else under `other`)
//!
//! All recorders are no-ops until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_form_submission(form: &'static str, outcome: &'static str) {
    counter!("site_form_submissions_total", "form" => form, "outcome" => outcome).increment(1);
}

pub fn record_rate_limited(form: &'static str) {
    counter!("site_rate_limited_total", "form" => form).increment(1);
}

pub fn record_blog_refresh(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("site_blog_refresh_total", "outcome" => outcome).increment(1);
}

pub fn record_cached_posts(count: usize) {
    gauge!("site_blog_cached_posts").set(count as f64);
}

pub fn record_web_vital(name: &'static str, value: f64) {
    histogram!("site_web_vitals", "name" => name).record(value);
}
