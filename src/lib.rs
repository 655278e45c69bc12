//! Real-estate site backend library.

pub mod blog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::SiteConfig;
pub use http::SiteServer;
pub use lifecycle::Shutdown;
