//! Trigger manager hand-off
//!
//! Once a backend exists, ownership of it passes to a [`TriggerManager`],
//! which runs for the rest of the process lifetime.

use crate::control_plane::ControlPlane;
use crate::mq::MessageQueue;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, info};

/// Long-running consumer of the message queue backend.
#[async_trait]
pub trait TriggerManager: Send {
    /// Run until the process is told to stop. Does not return otherwise.
    async fn run(self);
}

type ShutdownSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Default trigger manager: holds the control plane handle and the backend
/// and keeps them alive until a shutdown signal arrives.
pub struct MessageQueueTriggerManager {
    control_plane: Arc<dyn ControlPlane>,
    queue: Box<dyn MessageQueue>,
    shutdown: ShutdownSignal,
}

impl std::fmt::Debug for MessageQueueTriggerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageQueueTriggerManager")
            .field("control_plane", &self.control_plane.endpoint())
            .field("queue", &self.queue)
            .finish()
    }
}

impl MessageQueueTriggerManager {
    /// Create a manager that stops on Ctrl-C
    pub fn new(control_plane: Arc<dyn ControlPlane>, queue: Box<dyn MessageQueue>) -> Self {
        Self { control_plane, queue, shutdown: Box::pin(ctrl_c()) }
    }

    /// Replace the shutdown signal
    pub fn with_shutdown<F>(mut self, shutdown: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.shutdown = Box::pin(shutdown);
        self
    }

    /// The backend this manager drives
    pub fn queue(&self) -> &dyn MessageQueue {
        self.queue.as_ref()
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
}

#[async_trait]
impl TriggerManager for MessageQueueTriggerManager {
    async fn run(self) {
        info!(
            kind = self.queue.kind(),
            control_plane = %self.control_plane.endpoint(),
            router = %self.queue.router_url(),
            "Message queue trigger manager running"
        );

        self.shutdown.await;

        info!(
            kind = self.queue.kind(),
            active_subscriptions = self.queue.subscriptions().len(),
            "Shutdown signal received, stopping trigger manager"
        );
    }
}
