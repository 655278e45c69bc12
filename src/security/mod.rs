//! Request guard for the public form endpoints.
//!
//! # Data Flow
//! ```text
//! Form submission:
//!     → rate_limit.rs (per form, per client fixed window)
//!     → sanitize.rs (strip markup and script vectors)
//!     → validation.rs (shape and length checks)
//!     → csrf.rs (body token vs header token)
//!     → handler
//! Any rejection:
//!     → errors.rs (fixed client message + code)
//! ```
//!
//! # Design Decisions
//! - Fail closed: any failed check rejects the request
//! - Clients never see internal error text
//! - Limiter state is per process; multiple instances do not share quotas

pub mod csrf;
pub mod errors;
pub mod headers;
pub mod links;
pub mod rate_limit;
pub mod sanitize;
pub mod validation;

pub use csrf::{generate_csrf_token, validate_csrf_token};
pub use errors::{create_secure_error, sanitize_error_for_client, ClientError, ErrorCode, SecureError};
pub use links::{is_external_url, secure_link_rel};
pub use rate_limit::RateLimiter;
pub use sanitize::{sanitize_form_data, FormData};
pub use validation::{validate_form_data, ValidationResult};
