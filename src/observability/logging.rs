//! # Structured Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence
//! over the configured level so individual modules can be turned up
//! without touching the deployment.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter from `RUST_LOG`, falling back to `config.log_level`
pub fn build_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.log_level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e)))
}

/// Initialize the global subscriber.
///
/// A subscriber that is already installed (integration tests, embedding
/// binaries) is left in place.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json_logging {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(
            service_name = %config.service_name,
            log_level = %config.log_level,
            json = config.json_logging,
            "Logging initialized"
        );
    }
    Ok(())
}

/// Log the startup configuration
pub fn log_startup_info(router_url: &str, control_plane_url: &str) {
    tracing::info!(
        app_name = crate::APP_NAME,
        version = crate::VERSION,
        router_url = %router_url,
        control_plane_url = %control_plane_url,
        "Starting message queue trigger"
    );
}
