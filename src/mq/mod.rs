//! Message queue backend selection
//!
//! Every supported broker implements the [`MessageQueue`] trait. Which one
//! gets built is decided by a [`BackendRegistry`], a map from backend kind
//! to constructor.
//!
//! # Example
//!
//! ```rust
//! use mqtrigger::config::MessageQueueConfig;
//! use mqtrigger::mq::{BackendError, BackendRegistry};
//! use mqtrigger::secrets::CredentialMap;
//!
//! let registry = BackendRegistry::with_builtin_backends();
//! let config = MessageQueueConfig {
//!     kind: "rabbitmq".to_string(),
//!     url: "amqp://broker:5672".to_string(),
//!     secrets: CredentialMap::new(),
//! };
//!
//! let err = registry.create("http://router.fission", config).unwrap_err();
//! assert!(matches!(err, BackendError::UnsupportedKind { .. }));
//! ```

pub mod backends;
pub mod error;
pub mod queue;
pub mod registry;

pub use backends::{AzureStorageQueue, Kafka, NatsStreaming};
pub use error::{BackendError, Result};
pub use queue::{MessageQueue, MessageQueueTrigger, Subscription, SubscriptionSet};
pub use registry::{BackendConstructor, BackendRegistry};
