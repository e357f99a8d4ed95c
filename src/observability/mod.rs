//! # Observability
//!
//! Structured logging through the `tracing` ecosystem. Output is human
//! readable by default and JSON when enabled.

pub mod logging;

pub use logging::{build_filter, init_logging, log_startup_info};
