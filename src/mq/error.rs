//! Error types for message queue backend construction and use.

use thiserror::Error;

/// Result type for message queue operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors raised while selecting, constructing or using a backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// No constructor is registered for the requested kind.
    #[error("no supported message queue type found for {kind:?}")]
    UnsupportedKind { kind: String },

    /// The broker address is unusable for this backend.
    #[error("Invalid broker address '{url}': {reason}")]
    InvalidBrokerUrl { url: String, reason: String },

    /// A credential the backend needs is absent from the secrets directory.
    #[error("Missing credential '{name}'")]
    MissingCredential { name: String },

    /// A credential is present but malformed.
    #[error("Invalid credential '{name}': {reason}")]
    InvalidCredential { name: String, reason: String },

    /// A topic or queue name is not valid for this backend.
    #[error("Invalid topic '{topic}': {reason}")]
    InvalidTopic { topic: String, reason: String },

    /// The trigger already holds a subscription.
    #[error("Trigger '{trigger}' is already subscribed")]
    AlreadySubscribed { trigger: String },

    /// The trigger holds no subscription.
    #[error("Trigger '{trigger}' is not subscribed")]
    NotSubscribed { trigger: String },

    /// The broker rejected or could not complete the connection.
    #[error("Connection to message queue failed: {message}")]
    Connection { message: String },
}

impl BackendError {
    /// Create an unsupported kind error.
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedKind { kind: kind.into() }
    }

    /// Create an invalid broker address error.
    pub fn invalid_broker_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBrokerUrl { url: url.into(), reason: reason.into() }
    }

    /// Create a missing credential error.
    pub fn missing_credential(name: impl Into<String>) -> Self {
        Self::MissingCredential { name: name.into() }
    }

    /// Create an invalid credential error.
    pub fn invalid_credential(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCredential { name: name.into(), reason: reason.into() }
    }

    /// Create an invalid topic error.
    pub fn invalid_topic(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTopic { topic: topic.into(), reason: reason.into() }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into() }
    }
}
