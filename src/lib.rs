//! # mqtrigger
//!
//! Startup bootstrap for a message queue trigger front-end. The process
//! waits for the control plane, resolves its broker configuration from the
//! environment, loads broker credentials from a mounted secrets directory,
//! constructs the matching message queue backend and hands it to a
//! long-running trigger manager.
//!
//! ## Architecture
//!
//! ```text
//! Control plane ready → Settings → Secrets loader → Backend registry → Trigger manager
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mqtrigger::config::ControlPlaneConfig;
//! use mqtrigger::control_plane::{ControlPlane, HttpControlPlane};
//! use mqtrigger::mq::BackendRegistry;
//! use mqtrigger::trigger::MessageQueueTriggerManager;
//! use mqtrigger::{Bootstrap, Environment, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let control_plane = ControlPlaneConfig::default();
//!     let bootstrap = Bootstrap::new(
//!         Environment::capture(),
//!         "http://router.fission",
//!         BackendRegistry::with_builtin_backends(),
//!     );
//!     bootstrap
//!         .run(
//!             || {
//!                 let client = HttpControlPlane::connect(&control_plane)?;
//!                 Ok(Arc::new(client) as Arc<dyn ControlPlane>)
//!             },
//!             MessageQueueTriggerManager::new,
//!         )
//!         .await
//! }
//! ```

pub mod cli;
pub mod config;
pub mod control_plane;
pub mod errors;
pub mod mq;
pub mod observability;
pub mod secrets;
pub mod startup;
pub mod trigger;

// Re-export commonly used types and traits
pub use config::Environment;
pub use errors::{Error, Result};
pub use startup::{Bootstrap, StartupPhase};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
