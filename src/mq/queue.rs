//! The backend contract shared by every message queue kind.

use super::error::{BackendError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A trigger binding a queue topic to a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQueueTrigger {
    /// Trigger name, unique per backend
    pub name: String,
    /// Topic (subject, queue) to consume from
    pub topic: String,
    /// Topic to publish function responses to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_topic: Option<String>,
    /// Function invoked for each message
    pub function_name: String,
}

/// Handle for an active subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    /// Name of the subscribed trigger
    pub trigger_name: String,
    /// Topic the trigger consumes from
    pub topic: String,
    /// Kind of the backend that owns the subscription
    pub kind: &'static str,
}

/// A message queue backend.
///
/// Exactly one backend exists per process. After startup it is owned by the
/// trigger manager, which subscribes and unsubscribes triggers as they come
/// and go.
pub trait MessageQueue: Send + Sync + fmt::Debug {
    /// Registry kind this backend was built for
    fn kind(&self) -> &'static str;

    /// Broker address the backend was configured with
    fn broker_url(&self) -> &str;

    /// Router that consumed messages are forwarded to
    fn router_url(&self) -> &str;

    /// Start consuming `trigger.topic` on behalf of the trigger
    fn subscribe(&self, trigger: &MessageQueueTrigger) -> Result<Subscription>;

    /// Stop a subscription previously returned by [`MessageQueue::subscribe`]
    fn unsubscribe(&self, subscription: &Subscription) -> Result<()>;

    /// Active subscriptions, ordered by trigger name
    fn subscriptions(&self) -> Vec<Subscription>;
}

/// Subscription bookkeeping shared by the built-in backends.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    kind: &'static str,
    active: DashMap<String, Subscription>,
}

impl SubscriptionSet {
    /// Create an empty set for backends of `kind`.
    pub fn new(kind: &'static str) -> Self {
        Self { kind, active: DashMap::new() }
    }

    /// Record a subscription for `trigger`; a trigger can hold only one.
    pub fn add(&self, trigger: &MessageQueueTrigger) -> Result<Subscription> {
        match self.active.entry(trigger.name.clone()) {
            Entry::Occupied(_) => {
                Err(BackendError::AlreadySubscribed { trigger: trigger.name.clone() })
            }
            Entry::Vacant(slot) => {
                let subscription = Subscription {
                    trigger_name: trigger.name.clone(),
                    topic: trigger.topic.clone(),
                    kind: self.kind,
                };
                slot.insert(subscription.clone());
                debug!(
                    kind = self.kind,
                    trigger = %trigger.name,
                    topic = %trigger.topic,
                    function = %trigger.function_name,
                    "Subscribed trigger"
                );
                Ok(subscription)
            }
        }
    }

    /// Drop the subscription held by `subscription.trigger_name`.
    pub fn remove(&self, subscription: &Subscription) -> Result<()> {
        match self.active.remove(&subscription.trigger_name) {
            Some(_) => {
                debug!(
                    kind = self.kind,
                    trigger = %subscription.trigger_name,
                    "Unsubscribed trigger"
                );
                Ok(())
            }
            None => {
                Err(BackendError::NotSubscribed { trigger: subscription.trigger_name.clone() })
            }
        }
    }

    /// Active subscriptions ordered by trigger name.
    pub fn snapshot(&self) -> Vec<Subscription> {
        let mut subscriptions: Vec<Subscription> =
            self.active.iter().map(|entry| entry.value().clone()).collect();
        subscriptions.sort_by(|a, b| a.trigger_name.cmp(&b.trigger_name));
        subscriptions
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no subscription is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(name: &str, topic: &str) -> MessageQueueTrigger {
        MessageQueueTrigger {
            name: name.to_string(),
            topic: topic.to_string(),
            response_topic: None,
            function_name: "hello".to_string(),
        }
    }

    #[test]
    fn test_subscription_lifecycle() {
        let set = SubscriptionSet::new("kafka");
        let sub = set.add(&trigger("orders", "orders-in")).unwrap();
        assert_eq!(sub.kind, "kafka");
        assert_eq!(sub.topic, "orders-in");
        assert_eq!(set.len(), 1);

        set.remove(&sub).unwrap();
        assert!(set.is_empty());
        assert!(matches!(set.remove(&sub), Err(BackendError::NotSubscribed { .. })));
    }

    #[test]
    fn test_duplicate_trigger_is_rejected() {
        let set = SubscriptionSet::new("kafka");
        set.add(&trigger("orders", "a")).unwrap();

        let err = set.add(&trigger("orders", "b")).unwrap_err();
        assert!(matches!(
            err,
            BackendError::AlreadySubscribed { ref trigger } if trigger == "orders"
        ));
        assert_eq!(set.snapshot()[0].topic, "a");
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let set = SubscriptionSet::new("nats-streaming");
        set.add(&trigger("b", "t")).unwrap();
        set.add(&trigger("a", "t")).unwrap();

        let names: Vec<_> = set.snapshot().into_iter().map(|s| s.trigger_name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_trigger_deserializes_from_camel_case() {
        let trigger: MessageQueueTrigger = serde_json::from_str(
            r#"{"name":"t","topic":"in","responseTopic":"out","functionName":"f"}"#,
        )
        .unwrap();
        assert_eq!(trigger.response_topic.as_deref(), Some("out"));
        assert_eq!(trigger.function_name, "f");
    }
}
