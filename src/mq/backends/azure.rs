//! Azure Storage Queue backend.

use crate::config::MessageQueueConfig;
use crate::mq::error::{BackendError, Result};
use crate::mq::queue::{MessageQueue, MessageQueueTrigger, Subscription, SubscriptionSet};
use crate::secrets::{CredentialMap, SecretBytes};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;
use url::Url;
use zeroize::Zeroizing;

/// Credential holding the storage account name
pub const ACCOUNT_NAME: &str = "accountName";

/// Credential holding the base64 storage account key
pub const ACCOUNT_KEY: &str = "accountKey";

/// Azure Storage Queue backend
#[derive(Debug)]
pub struct AzureStorageQueue {
    url: String,
    endpoint: Url,
    account_name: String,
    account_key: SecretBytes,
    router_url: String,
    subscriptions: SubscriptionSet,
}

impl AzureStorageQueue {
    /// Registry kind
    pub const KIND: &'static str = "azure-storage-queue";

    /// Build a backend from storage account credentials.
    ///
    /// An empty broker URL selects the public queue endpoint of the account.
    pub fn new(router_url: &str, config: MessageQueueConfig) -> Result<Self> {
        let account_name = account_name(&config.secrets)?;
        let account_key = account_key(&config.secrets)?;

        let endpoint = if config.url.trim().is_empty() {
            let default = format!("https://{}.queue.core.windows.net", account_name);
            Url::parse(&default)
                .map_err(|e| BackendError::invalid_broker_url(default, e.to_string()))?
        } else {
            let parsed = Url::parse(&config.url)
                .map_err(|e| BackendError::invalid_broker_url(&config.url, e.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(BackendError::invalid_broker_url(
                    &config.url,
                    "queue endpoint must be http or https",
                ));
            }
            parsed
        };

        info!(
            kind = Self::KIND,
            account = %account_name,
            endpoint = %endpoint,
            "Azure storage queue backend configured"
        );

        Ok(Self {
            url: config.url,
            endpoint,
            account_name,
            account_key,
            router_url: router_url.to_string(),
            subscriptions: SubscriptionSet::new(Self::KIND),
        })
    }

    /// Queue service endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Storage account name
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Storage account key, as mounted
    pub fn account_key(&self) -> &SecretBytes {
        &self.account_key
    }
}

fn account_name(secrets: &CredentialMap) -> Result<String> {
    let name = secrets
        .get(ACCOUNT_NAME)
        .ok_or_else(|| BackendError::missing_credential(ACCOUNT_NAME))?
        .expose_str()
        .map(str::trim)
        .ok_or_else(|| BackendError::invalid_credential(ACCOUNT_NAME, "not valid UTF-8"))?;

    let valid = (3..=24).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !valid {
        return Err(BackendError::invalid_credential(
            ACCOUNT_NAME,
            "must be 3 to 24 lowercase letters or digits",
        ));
    }
    Ok(name.to_string())
}

fn account_key(secrets: &CredentialMap) -> Result<SecretBytes> {
    let key =
        secrets.get(ACCOUNT_KEY).ok_or_else(|| BackendError::missing_credential(ACCOUNT_KEY))?;
    let encoded = key
        .expose_str()
        .map(str::trim)
        .filter(|encoded| !encoded.is_empty())
        .ok_or_else(|| BackendError::invalid_credential(ACCOUNT_KEY, "must be non-empty text"))?;

    let _decoded = Zeroizing::new(
        STANDARD
            .decode(encoded)
            .map_err(|_| BackendError::invalid_credential(ACCOUNT_KEY, "not valid base64"))?,
    );
    Ok(key.clone())
}

/// Queue names: 3 to 63 lowercase letters, digits and single hyphens,
/// starting and ending with a letter or digit.
fn validate_queue_name(name: &str) -> Result<()> {
    let valid = (3..=63).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--");
    if valid {
        Ok(())
    } else {
        Err(BackendError::invalid_topic(
            name,
            "queue names are 3-63 lowercase letters, digits or single hyphens",
        ))
    }
}

impl MessageQueue for AzureStorageQueue {
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
        validate_queue_name(&trigger.topic)?;
        if let Some(response_topic) = &trigger.response_topic {
            validate_queue_name(response_topic)?;
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
