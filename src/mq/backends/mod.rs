//! Built-in message queue backends
//!
//! - **nats-streaming**: NATS Streaming server, `nats://` or `tls://` URL
//! - **kafka**: Kafka bootstrap broker list, optional mutual TLS
//! - **azure-storage-queue**: Azure Storage queues, account key credentials
//!
//! Constructors check the broker address and credentials they are given and
//! fail early on anything unusable.

pub mod azure;
pub mod kafka;
pub mod nats;

pub use azure::AzureStorageQueue;
pub use kafka::{Kafka, KafkaTls};
pub use nats::NatsStreaming;
