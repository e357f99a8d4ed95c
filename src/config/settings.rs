//! # Configuration Settings
//!
//! Defines the configuration structures for the message queue trigger.

use super::Environment;
use crate::errors::{Error, Result};
use crate::secrets::CredentialMap;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Selects the message queue backend kind.
pub const ENV_MESSAGE_QUEUE_TYPE: &str = "MESSAGE_QUEUE_TYPE";

/// Broker address handed verbatim to the backend constructor.
pub const ENV_MESSAGE_QUEUE_URL: &str = "MESSAGE_QUEUE_URL";

/// Optional directory holding broker credentials.
pub const ENV_MESSAGE_QUEUE_SECRETS: &str = "MESSAGE_QUEUE_SECRETS";

/// Message queue selection parameters, as found in the environment.
///
/// Values are kept exactly as given; checking the kind and URL is the
/// backend factory's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQueueSettings {
    /// Backend kind selector
    pub kind: String,
    /// Broker address
    pub url: String,
    /// Secrets directory, trimmed; empty means no credentials
    pub secrets_path: String,
}

impl MessageQueueSettings {
    /// Resolve settings from an environment snapshot. Never fails.
    pub fn resolve(env: &Environment) -> Self {
        Self {
            kind: env.get(ENV_MESSAGE_QUEUE_TYPE).unwrap_or_default().to_string(),
            url: env.get(ENV_MESSAGE_QUEUE_URL).unwrap_or_default().to_string(),
            secrets_path: env.get(ENV_MESSAGE_QUEUE_SECRETS).unwrap_or_default().trim().to_string(),
        }
    }

    /// The secrets directory to load, if one was configured.
    pub fn secrets_dir(&self) -> Option<&Path> {
        if self.secrets_path.is_empty() {
            None
        } else {
            Some(Path::new(&self.secrets_path))
        }
    }

    /// Combine the settings with loaded credentials into a backend config.
    pub fn into_config(self, secrets: CredentialMap) -> MessageQueueConfig {
        MessageQueueConfig { kind: self.kind, url: self.url, secrets }
    }
}

/// Everything a backend constructor receives about its broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQueueConfig {
    /// Backend kind the config was resolved for
    pub kind: String,
    /// Broker address, unmodified
    pub url: String,
    /// Credentials loaded from the secrets directory
    pub secrets: CredentialMap,
}

/// Control plane client configuration
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ControlPlaneConfig {
    /// Control plane base URL
    #[validate(url(message = "Control plane URL must be a valid URL"))]
    pub url: String,

    /// Delay between schema readiness checks, in milliseconds
    #[validate(range(
        min = 10,
        max = 60000,
        message = "Poll interval must be between 10 and 60000 milliseconds"
    ))]
    pub poll_interval_ms: u64,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self { url: "http://controller.fission".to_string(), poll_interval_ms: 1000 }
    }
}

impl ControlPlaneConfig {
    /// Validate the control plane configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: crate::APP_NAME.to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    /// Validate the logging configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)
    }
}
