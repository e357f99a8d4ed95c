//! Control plane access
//!
//! The control plane stores trigger and function definitions. Before the
//! trigger front-end starts, the schemas for those definitions must be
//! installed; [`ControlPlane::wait_for_schemas`] blocks until they are.
//! How long and how often to wait is entirely up to the client
//! implementation.

pub mod http;

pub use http::HttpControlPlane;

use async_trait::async_trait;
use thiserror::Error;

/// Schemas the trigger front-end depends on.
pub const REQUIRED_SCHEMAS: &[&str] =
    &["environments", "functions", "messagequeuetriggers", "packages"];

/// Errors raised by control plane clients.
#[derive(Error, Debug)]
pub enum ControlPlaneError {
    /// The configured control plane address is unusable.
    #[error("Invalid control plane endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The HTTP client could not be built.
    #[error("Failed to build control plane client: {0}")]
    Client(#[source] reqwest::Error),

    /// The control plane answered with something that is not a schema list.
    #[error("Unexpected control plane response: {message}")]
    InvalidResponse { message: String },
}

impl ControlPlaneError {
    /// Create an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint { url: url.into(), reason: reason.into() }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse { message: message.into() }
    }
}

/// Handle to the control plane.
#[async_trait]
pub trait ControlPlane: Send + Sync + std::fmt::Debug {
    /// Address of the control plane, for diagnostics
    fn endpoint(&self) -> &str;

    /// Block until every schema in [`REQUIRED_SCHEMAS`] is installed
    async fn wait_for_schemas(&self) -> Result<(), ControlPlaneError>;
}

/// Required schemas absent from `installed`, in [`REQUIRED_SCHEMAS`] order.
pub fn missing_schemas<S: AsRef<str>>(installed: &[S]) -> Vec<&'static str> {
    REQUIRED_SCHEMAS
        .iter()
        .copied()
        .filter(|required| !installed.iter().any(|name| name.as_ref() == *required))
        .collect()
}
