//! Client-safe errors for the public endpoints.
//!
//! Internal messages stay in the logs; clients only ever see the fixed
//! message attached to each [`ErrorCode`].

use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    RateLimitExceeded,
    CsrfTokenInvalid,
    GenericError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::CsrfTokenInvalid => "CSRF_TOKEN_INVALID",
            ErrorCode::GenericError => "GENERIC_ERROR",
        }
    }

    /// The only text a client sees for this code.
    pub fn client_message(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Please check your input and try again.",
            ErrorCode::RateLimitExceeded => "Too many requests. Please try again later.",
            ErrorCode::CsrfTokenInvalid => {
                "Security token invalid. Please refresh the page and try again."
            }
            ErrorCode::GenericError => "An error occurred. Please try again later.",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::GenericError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised by the request guard or a form handler.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct SecureError {
    pub code: ErrorCode,
    /// Internal detail. Logged, never returned.
    pub message: String,
}

pub fn create_secure_error(message: impl Into<String>, code: ErrorCode) -> SecureError {
    SecureError {
        code,
        message: message.into(),
    }
}

/// Body returned to clients for any failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientError {
    pub success: bool,
    pub message: &'static str,
    pub code: ErrorCode,
}

impl ClientError {
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            success: false,
            message: code.client_message(),
            code,
        }
    }
}

/// Map any error onto a pre-approved message. Errors that are not a
/// [`SecureError`] become `GENERIC_ERROR`.
pub fn sanitize_error_for_client(error: &(dyn StdError + 'static)) -> ClientError {
    match error.downcast_ref::<SecureError>() {
        Some(secure) => ClientError::from_code(secure.code),
        None => ClientError::from_code(ErrorCode::GenericError),
    }
}

impl IntoResponse for SecureError {
    fn into_response(self) -> Response {
        match self.code {
            ErrorCode::GenericError => {
                tracing::error!(code = %self.code, detail = %self.message, "Request failed")
            }
            _ => tracing::warn!(code = %self.code, detail = %self.message, "Request rejected"),
        }
        let body = sanitize_error_for_client(&self);
        (self.code.status(), Json(body)).into_response()
    }
}
