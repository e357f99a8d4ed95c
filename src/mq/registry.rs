//! Message queue backend registry
//!
//! Maps backend kind identifiers to constructors. Adding a kind means
//! registering a constructor; existing kinds are never touched.

use super::backends::{AzureStorageQueue, Kafka, NatsStreaming};
use super::error::{BackendError, Result};
use super::queue::MessageQueue;
use crate::config::MessageQueueConfig;
use std::collections::HashMap;
use tracing::{debug, info};

/// Builds a backend from the router URL and the resolved broker config.
pub type BackendConstructor =
    Box<dyn Fn(&str, MessageQueueConfig) -> Result<Box<dyn MessageQueue>> + Send + Sync>;

/// Registry of message queue backend constructors
///
/// Lookup is by exact, case-sensitive kind string.
pub struct BackendRegistry {
    constructors: HashMap<String, BackendConstructor>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry").field("kinds", &self.registered_kinds()).finish()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendRegistry {
    /// Create a new registry with no backends
    pub fn new() -> Self {
        Self { constructors: HashMap::new() }
    }

    /// Create a registry holding every built-in backend kind
    pub fn with_builtin_backends() -> Self {
        let mut registry = Self::new();
        registry.register(NatsStreaming::KIND, |router_url, config| {
            Ok(Box::new(NatsStreaming::new(router_url, config)?) as Box<dyn MessageQueue>)
        });
        registry.register(AzureStorageQueue::KIND, |router_url, config| {
            Ok(Box::new(AzureStorageQueue::new(router_url, config)?) as Box<dyn MessageQueue>)
        });
        registry.register(Kafka::KIND, |router_url, config| {
            Ok(Box::new(Kafka::new(router_url, config)?) as Box<dyn MessageQueue>)
        });
        registry
    }

    /// Register a constructor for `kind`, replacing any previous one
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&str, MessageQueueConfig) -> Result<Box<dyn MessageQueue>> + Send + Sync + 'static,
    {
        let kind = kind.into();
        debug!(kind = %kind, "Registering message queue backend");
        self.constructors.insert(kind, Box::new(constructor));
    }

    /// Check if a backend kind is registered
    pub fn is_registered(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered backend kinds, sorted
    pub fn registered_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Construct the backend registered for `config.kind`
    ///
    /// The constructor receives `router_url` and `config` untouched, and its
    /// error is returned as is. An unknown kind fails with
    /// [`BackendError::UnsupportedKind`] without running any constructor.
    pub fn create(
        &self,
        router_url: &str,
        config: MessageQueueConfig,
    ) -> Result<Box<dyn MessageQueue>> {
        let constructor = self
            .constructors
            .get(&config.kind)
            .ok_or_else(|| BackendError::unsupported_kind(config.kind.clone()))?;

        info!(
            kind = %config.kind,
            credentials = config.secrets.len(),
            "Creating message queue backend"
        );
        constructor(router_url, config)
    }
}
