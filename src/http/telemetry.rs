//! Browser telemetry intake.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::observability::metrics;

/// Vital names kept as metric labels.
pub const WEB_VITALS: &[&str] = &["CLS", "FCP", "FID", "INP", "LCP", "TTFB"];

/// Label under which unknown vital names are recorded.
pub const OTHER_VITAL: &str = "other";

#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

/// Metric label for a reported vital name. Unknown names collapse to
/// [`OTHER_VITAL`] so clients cannot create label series.
pub fn vital_label(name: &str) -> &'static str {
    WEB_VITALS
        .iter()
        .copied()
        .find(|known| *known == name)
        .unwrap_or(OTHER_VITAL)
}

/// `POST /api/web-vitals`: log whatever the browser reports.
pub async fn report_web_vitals(body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Failed to process web vitals");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(Ack { success: false })).into_response();
        }
    };

    let name = payload.get("name").and_then(Value::as_str).unwrap_or("unknown");
    if let Some(value) = payload.get("value").and_then(Value::as_f64) {
        metrics::record_web_vital(vital_label(name), value);
    }
    tracing::info!(metric = name, payload = %payload, "Web vitals reported");

    Json(Ack { success: true }).into_response()
}
