//! Kafka backend.
//!
//! The broker URL is a comma-separated list of `host:port` bootstrap brokers.
//! Mutual TLS is switched on by mounting a client certificate and key in the
//! secrets directory.

use crate::config::MessageQueueConfig;
use crate::mq::error::{BackendError, Result};
use crate::mq::queue::{MessageQueue, MessageQueueTrigger, Subscription, SubscriptionSet};
use crate::secrets::{CredentialMap, SecretBytes};
use tracing::info;

/// Credential holding the CA bundle used to verify brokers
pub const CA_CERT: &str = "caCert";

/// Credential holding the client certificate
pub const USER_CERT: &str = "userCert";

/// Credential holding the client private key
pub const USER_KEY: &str = "userKey";

/// Kafka's limit on topic name length.
const MAX_TOPIC_LEN: usize = 249;

/// Client TLS material taken from the credential map
#[derive(Debug, Clone)]
pub struct KafkaTls {
    /// CA bundle, if brokers use a private CA
    pub ca_cert: Option<SecretBytes>,
    /// Client certificate (PEM)
    pub user_cert: SecretBytes,
    /// Client private key (PEM)
    pub user_key: SecretBytes,
}

/// Kafka backend
#[derive(Debug)]
pub struct Kafka {
    url: String,
    brokers: Vec<String>,
    router_url: String,
    tls: Option<KafkaTls>,
    subscriptions: SubscriptionSet,
}

impl Kafka {
    /// Registry kind
    pub const KIND: &'static str = "kafka";

    /// Build a backend from a broker list and optional TLS credentials.
    pub fn new(router_url: &str, config: MessageQueueConfig) -> Result<Self> {
        let brokers = parse_brokers(&config.url)?;
        let tls = tls_from_secrets(&config.secrets)?;

        info!(
            kind = Self::KIND,
            brokers = brokers.len(),
            tls_enabled = tls.is_some(),
            "Kafka backend configured"
        );

        Ok(Self {
            url: config.url,
            brokers,
            router_url: router_url.to_string(),
            tls,
            subscriptions: SubscriptionSet::new(Self::KIND),
        })
    }

    /// Bootstrap brokers, in configured order
    pub fn brokers(&self) -> &[String] {
        &self.brokers
    }

    /// TLS material, when TLS is enabled
    pub fn tls(&self) -> Option<&KafkaTls> {
        self.tls.as_ref()
    }
}

fn parse_brokers(url: &str) -> Result<Vec<String>> {
    if url.trim().is_empty() {
        return Err(BackendError::invalid_broker_url(url, "no brokers configured"));
    }

    url.split(',')
        .map(str::trim)
        .map(|broker| {
            let (host, port) = broker.rsplit_once(':').ok_or_else(|| {
                BackendError::invalid_broker_url(url, format!("'{}' is not host:port", broker))
            })?;
            if host.is_empty() {
                return Err(BackendError::invalid_broker_url(
                    url,
                    format!("'{}' has no host", broker),
                ));
            }
            match port.parse::<u16>() {
                Ok(p) if p != 0 => Ok(broker.to_string()),
                _ => Err(BackendError::invalid_broker_url(
                    url,
                    format!("'{}' has an invalid port", broker),
                )),
            }
        })
        .collect()
}

fn looks_like_pem(secret: &SecretBytes) -> bool {
    secret.expose_secret().windows(11).any(|w| w == b"-----BEGIN ")
}

fn tls_from_secrets(secrets: &CredentialMap) -> Result<Option<KafkaTls>> {
    let (user_cert, user_key) = match (secrets.get(USER_CERT), secrets.get(USER_KEY)) {
        (None, None) => return Ok(None),
        (Some(_), None) => return Err(BackendError::missing_credential(USER_KEY)),
        (None, Some(_)) => return Err(BackendError::missing_credential(USER_CERT)),
        (Some(cert), Some(key)) => (cert, key),
    };

    for (name, secret) in [(USER_CERT, user_cert), (USER_KEY, user_key)] {
        if !looks_like_pem(secret) {
            return Err(BackendError::invalid_credential(name, "expected PEM encoded data"));
        }
    }
    let ca_cert = secrets.get(CA_CERT).cloned();
    if let Some(ca) = &ca_cert {
        if !looks_like_pem(ca) {
            return Err(BackendError::invalid_credential(CA_CERT, "expected PEM encoded data"));
        }
    }

    Ok(Some(KafkaTls { ca_cert, user_cert: user_cert.clone(), user_key: user_key.clone() }))
}

fn validate_topic(topic: &str) -> Result<()> {
    if topic.is_empty() || topic.len() > MAX_TOPIC_LEN {
        return Err(BackendError::invalid_topic(
            topic,
            format!("length must be between 1 and {}", MAX_TOPIC_LEN),
        ));
    }
    if topic == "." || topic == ".." {
        return Err(BackendError::invalid_topic(topic, "'.' and '..' are reserved"));
    }
    if !topic.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(BackendError::invalid_topic(topic, "allowed characters are [a-zA-Z0-9._-]"));
    }
    Ok(())
}

impl MessageQueue for Kafka {
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
        validate_topic(&trigger.topic)?;
        if let Some(response_topic) = &trigger.response_topic {
            validate_topic(response_topic)?;
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
