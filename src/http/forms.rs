//! Lead-capture form endpoints: contact, home value, property search.
//!
//! Every submission runs the same guard pipeline:
//! rate limit → JSON object body → sanitise → validate → CSRF →
//! required fields → processing.

use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::{RateLimitQuota, RateLimitsConfig};
use crate::http::request::ClientIp;
use crate::http::response::MessageResponse;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::csrf::{CSRF_FIELD, CSRF_HEADER};
use crate::security::{
    create_secure_error, generate_csrf_token, sanitize_form_data, validate_csrf_token,
    validate_form_data, ErrorCode, SecureError,
};

/// The three public forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Contact,
    HomeValue,
    Search,
}

impl FormKind {
    pub fn name(self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::HomeValue => "home_value",
            FormKind::Search => "search",
        }
    }

    pub fn quota(self, limits: &RateLimitsConfig) -> RateLimitQuota {
        match self {
            FormKind::Contact => limits.contact,
            FormKind::HomeValue => limits.home_value,
            FormKind::Search => limits.search,
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            FormKind::Contact => &["name", "email", "message"],
            FormKind::HomeValue => &["address", "email"],
            FormKind::Search => &["searchQuery"],
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            FormKind::Contact => "Thank you for your message! We'll get back to you soon.",
            FormKind::HomeValue => {
                "Thank you! Your home value report request has been received."
            }
            FormKind::Search => "Search request received. We'll send matching properties shortly.",
        }
    }
}

pub async fn submit_contact(
    State(state): State<AppState>,
    client: ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, SecureError> {
    handle_submission(&state, FormKind::Contact, &client, &headers, &body).await
}

pub async fn submit_home_value(
    State(state): State<AppState>,
    client: ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, SecureError> {
    handle_submission(&state, FormKind::HomeValue, &client, &headers, &body).await
}

pub async fn submit_search(
    State(state): State<AppState>,
    client: ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, SecureError> {
    handle_submission(&state, FormKind::Search, &client, &headers, &body).await
}

async fn handle_submission(
    state: &AppState,
    kind: FormKind,
    client: &ClientIp,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Json<MessageResponse>, SecureError> {
    let result = process_submission(state, kind, client, headers, body).await;
    let outcome = match &result {
        Ok(_) => "accepted",
        Err(e) => match e.code {
            ErrorCode::ValidationError => "invalid",
            ErrorCode::RateLimitExceeded => "rate_limited",
            ErrorCode::CsrfTokenInvalid => "csrf_rejected",
            ErrorCode::GenericError => "error",
        },
    };
    metrics::record_form_submission(kind.name(), outcome);
    result.map(Json)
}

/// Run the guard pipeline and the simulated processing for one submission.
pub async fn process_submission(
    state: &AppState,
    kind: FormKind,
    client: &ClientIp,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<MessageResponse, SecureError> {
    let config = state.config();

    let identifier = format!("{}:{}", kind.name(), client.as_str());
    if !state.limiter.check(&identifier, &kind.quota(&config.rate_limits)) {
        metrics::record_rate_limited(kind.name());
        return Err(create_secure_error(
            format!("quota exhausted for {identifier}"),
            ErrorCode::RateLimitExceeded,
        ));
    }

    let raw: Value = serde_json::from_slice(body).map_err(|e| {
        create_secure_error(format!("malformed JSON body: {e}"), ErrorCode::ValidationError)
    })?;
    let Value::Object(raw) = raw else {
        return Err(create_secure_error(
            "body is not a JSON object",
            ErrorCode::ValidationError,
        ));
    };

    let form = sanitize_form_data(&raw);
    let validation = validate_form_data(&form);
    if !validation.is_valid {
        return Err(create_secure_error(
            validation.errors.join("; "),
            ErrorCode::ValidationError,
        ));
    }

    let submitted_token = form.get(CSRF_FIELD).unwrap_or_default();
    let session_token = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !validate_csrf_token(submitted_token, session_token) {
        return Err(create_secure_error(
            "CSRF token missing or mismatched",
            ErrorCode::CsrfTokenInvalid,
        ));
    }

    let missing: Vec<&str> = kind
        .required_fields()
        .iter()
        .copied()
        .filter(|field| !form.has(field))
        .collect();
    if !missing.is_empty() {
        return Err(create_secure_error(
            format!("missing required fields: {}", missing.join(", ")),
            ErrorCode::ValidationError,
        ));
    }

    let submission_id = Uuid::new_v4();
    if config.forms.processing_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.forms.processing_delay_ms)).await;
    }

    // Field names only; values are personal data.
    let fields: Vec<&str> = form.fields().filter(|f| *f != CSRF_FIELD).collect();
    tracing::info!(
        %submission_id,
        form = kind.name(),
        client = %client.as_str(),
        fields = ?fields,
        "Form submission accepted"
    );

    Ok(MessageResponse::ok(kind.success_message()))
}

#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub token: String,
}

/// Issue a fresh token for the client to echo in `_csrf` and `x-csrf-token`.
pub async fn issue_csrf_token() -> Response {
    let mut response = Json(CsrfTokenResponse {
        token: generate_csrf_token(),
    })
    .into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
