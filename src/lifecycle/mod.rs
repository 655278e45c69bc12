//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Build state → Bind listener
//!
//! Shutdown:
//!     signals.rs (SIGINT/SIGTERM) → shutdown.rs broadcast
//!     → server stops accepting, drains in-flight requests
//!     → sweeper and config-update tasks exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
