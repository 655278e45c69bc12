//! Shared JSON response shapes.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// `{success, message}` body used by most endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failure(message: &'static str) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// 405 for form routes hit with anything but POST.
pub async fn method_not_allowed() -> Response {
    let mut response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MessageResponse::failure("Method not allowed")),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("POST"));
    response
}

pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(MessageResponse::failure("Unauthorized")),
    )
        .into_response()
}
