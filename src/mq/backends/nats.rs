//! NATS Streaming backend.

use crate::config::MessageQueueConfig;
use crate::mq::error::{BackendError, Result};
use crate::mq::queue::{MessageQueue, MessageQueueTrigger, Subscription, SubscriptionSet};
use tracing::info;
use url::Url;

/// Streaming cluster the trigger connects to.
const CLUSTER_ID: &str = "fissionMQTrigger";

/// Client id announced to the streaming server.
const CLIENT_ID: &str = "fission";

/// NATS Streaming backend
#[derive(Debug)]
pub struct NatsStreaming {
    url: String,
    server_address: String,
    router_url: String,
    subscriptions: SubscriptionSet,
}

impl NatsStreaming {
    /// Registry kind
    pub const KIND: &'static str = "nats-streaming";

    /// Port used when the broker URL has none
    pub const DEFAULT_PORT: u16 = 4222;

    /// Build a backend for a `nats://` or `tls://` broker URL.
    pub fn new(router_url: &str, config: MessageQueueConfig) -> Result<Self> {
        let parsed = Url::parse(&config.url)
            .map_err(|e| BackendError::invalid_broker_url(&config.url, e.to_string()))?;

        match parsed.scheme() {
            "nats" | "tls" => {}
            other => {
                return Err(BackendError::invalid_broker_url(
                    &config.url,
                    format!("unsupported scheme '{}', expected nats or tls", other),
                ))
            }
        }

        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| BackendError::invalid_broker_url(&config.url, "missing host"))?;
        let server_address = format!("{}:{}", host, parsed.port().unwrap_or(Self::DEFAULT_PORT));

        info!(
            kind = Self::KIND,
            server = %server_address,
            cluster_id = CLUSTER_ID,
            client_id = CLIENT_ID,
            "NATS streaming backend configured"
        );

        Ok(Self {
            url: config.url,
            server_address,
            router_url: router_url.to_string(),
            subscriptions: SubscriptionSet::new(Self::KIND),
        })
    }

    /// `host:port` of the streaming server
    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    /// Streaming cluster id
    pub fn cluster_id(&self) -> &'static str {
        CLUSTER_ID
    }

    /// Client id
    pub fn client_id(&self) -> &'static str {
        CLIENT_ID
    }
}

/// Subjects are dot-separated tokens without whitespace.
fn validate_subject(subject: &str) -> Result<()> {
    if subject.is_empty() {
        return Err(BackendError::invalid_topic(subject, "subject cannot be empty"));
    }
    if subject.chars().any(char::is_whitespace) {
        return Err(BackendError::invalid_topic(subject, "subject cannot contain whitespace"));
    }
    if subject.split('.').any(str::is_empty) {
        return Err(BackendError::invalid_topic(subject, "subject cannot contain empty tokens"));
    }
    Ok(())
}

impl MessageQueue for NatsStreaming {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn broker_url(&self) -> &str {
        &self.url
    }

    fn router_url(&self) -> &str {
        &self.router_url
    }

    fn subscribe(&self, trigger: &MessageQueueTrigger) -> Result<Subscription> {
        validate_subject(&trigger.topic)?;
        if let Some(response_topic) = &trigger.response_topic {
            validate_subject(response_topic)?;
        }
        self.subscriptions.add(trigger)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> Result<()> {
        self.subscriptions.remove(subscription)
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.snapshot()
    }
}
