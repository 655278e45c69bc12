//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, client identity)
//!     → forms.rs | blog_sync.rs | telemetry.rs
//!     → response.rs / security::errors (JSON bodies)
//! ```

pub mod blog_sync;
pub mod forms;
pub mod request;
pub mod response;
pub mod server;
pub mod telemetry;

pub use request::{ClientIp, X_REQUEST_ID};
pub use server::{AppState, SiteServer};
