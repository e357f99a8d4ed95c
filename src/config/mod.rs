//! # Configuration Management
//!
//! Startup configuration for the message queue trigger. Process variables
//! are captured exactly once, at the entry point, into an [`Environment`]
//! snapshot that is then passed down by value. Nothing below `main` reads the
//! process environment directly.

pub mod settings;

pub use settings::{
    ControlPlaneConfig, MessageQueueConfig, MessageQueueSettings, ObservabilityConfig,
    ENV_MESSAGE_QUEUE_SECRETS, ENV_MESSAGE_QUEUE_TYPE, ENV_MESSAGE_QUEUE_URL,
};

use std::collections::HashMap;

/// Immutable snapshot of process variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are left out.
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Return a copy of this snapshot with `key` set to `value`.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
