//! # Error Handling
//!
//! Crate-wide error type for the message queue trigger bootstrap. Each
//! component keeps its own `thiserror` enum; this module folds them into a
//! single [`Error`] and classifies which failures are fatal to the process.

use crate::control_plane::ControlPlaneError;
use crate::mq::BackendError;
use crate::secrets::SecretsError;

/// Custom result type for bootstrap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the message queue trigger bootstrap
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The control plane could not be reached or never reported ready
    #[error("Error waiting for control plane schemas: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    /// Loading message queue credentials failed
    #[error("Failed to load message queue secrets: {0}")]
    Secrets(#[from] SecretsError),

    /// The message queue backend could not be created
    #[error("Failed to create message queue backend: {0}")]
    Backend(#[source] BackendError),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Whether the process must terminate instead of handing the error back.
    ///
    /// A trigger front-end without a working backend can never fire a
    /// trigger, so backend construction failures are fatal. Everything else
    /// is left to the embedding process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Validation failed: {}", message))
    }
}
