//! # Command Line Interface
//!
//! Process-level settings for the trigger binary. Each flag can also be set
//! through its environment variable. The message queue itself is configured
//! only through `MESSAGE_QUEUE_*` variables, see [`crate::config`].

use crate::config::{ControlPlaneConfig, ObservabilityConfig};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "mqtrigger")]
#[command(about = "Message queue trigger front-end")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Router URL forwarded to the message queue backend
    #[arg(long, env = "ROUTER_URL", default_value = "http://router.fission")]
    pub router_url: String,

    /// Control plane base URL
    #[arg(long, env = "CONTROL_PLANE_URL", default_value = "http://controller.fission")]
    pub control_plane_url: String,

    /// Delay between control plane readiness checks, in milliseconds
    #[arg(long, env = "CONTROL_PLANE_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Log level or filter directive, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Control plane client settings
    pub fn control_plane_config(&self) -> ControlPlaneConfig {
        ControlPlaneConfig {
            url: self.control_plane_url.clone(),
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Logging settings; `--verbose` raises the level to debug
    pub fn observability_config(&self) -> ObservabilityConfig {
        let log_level = if self.verbose { "debug".to_string() } else { self.log_level.clone() };
        ObservabilityConfig { log_level, json_logging: self.json_logs, ..Default::default() }
    }
}
