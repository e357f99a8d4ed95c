//! Startup sequence for the message queue trigger
//!
//! This module drives the bootstrap, one phase at a time:
//! - Wait for the control plane to report its schemas installed
//! - Resolve the message queue settings from the environment snapshot
//! - Load broker credentials, when a secrets directory is configured
//! - Construct the backend for the configured kind
//! - Hand control plane and backend over to the trigger manager
//!
//! Control plane and secrets failures are returned to the caller as is. A
//! backend that cannot be constructed is reported as a fatal [`Error`]; the
//! entry point terminates the process on it.

use crate::config::{Environment, MessageQueueSettings};
use crate::control_plane::{ControlPlane, ControlPlaneError};
use crate::errors::{Error, Result};
use crate::mq::{BackendRegistry, MessageQueue};
use crate::secrets::{load_secrets, CredentialMap};
use crate::trigger::TriggerManager;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Phases of the startup sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    /// Nothing done yet
    Init,
    /// Control plane schemas are installed
    ControlPlaneReady,
    /// Message queue settings resolved
    ConfigResolved,
    /// Credentials loaded (possibly none)
    SecretsLoaded,
    /// Backend constructed
    BackendConstructed,
    /// Trigger manager running
    Running,
    /// Startup failed
    Aborted,
}

impl StartupPhase {
    /// Phase name as logged
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ControlPlaneReady => "control_plane_ready",
            Self::ConfigResolved => "config_resolved",
            Self::SecretsLoaded => "secrets_loaded",
            Self::BackendConstructed => "backend_constructed",
            Self::Running => "running",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for StartupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The bootstrap for one process start
#[derive(Debug)]
pub struct Bootstrap {
    environment: Environment,
    router_url: String,
    registry: BackendRegistry,
    phase: StartupPhase,
}

impl Bootstrap {
    /// Create a bootstrap over an environment snapshot and backend registry
    pub fn new(
        environment: Environment,
        router_url: impl Into<String>,
        registry: BackendRegistry,
    ) -> Self {
        Self { environment, router_url: router_url.into(), registry, phase: StartupPhase::Init }
    }

    fn enter(&mut self, phase: StartupPhase) {
        info!(from = %self.phase, to = %phase, "Startup phase complete");
        self.phase = phase;
    }

    /// Run the startup sequence and then the trigger manager.
    ///
    /// `connect` provides the control plane handle. `make_manager` receives
    /// that handle and the backend, and the manager it returns is run to
    /// completion. Nothing is retried here.
    pub async fn run<C, F, M>(mut self, connect: C, make_manager: F) -> Result<()>
    where
        C: FnOnce() -> std::result::Result<Arc<dyn ControlPlane>, ControlPlaneError>,
        F: FnOnce(Arc<dyn ControlPlane>, Box<dyn MessageQueue>) -> M,
        M: TriggerManager,
    {
        let (control_plane, queue) = match self.prepare(connect).await {
            Ok(ready) => ready,
            Err(e) => {
                info!(failed_after = %self.phase, to = %StartupPhase::Aborted, "Startup aborted");
                return Err(e);
            }
        };

        let manager = make_manager(control_plane, queue);
        self.enter(StartupPhase::Running);
        manager.run().await;
        Ok(())
    }

    async fn prepare<C>(
        &mut self,
        connect: C,
    ) -> Result<(Arc<dyn ControlPlane>, Box<dyn MessageQueue>)>
    where
        C: FnOnce() -> std::result::Result<Arc<dyn ControlPlane>, ControlPlaneError>,
    {
        let control_plane = connect()?;
        info!(endpoint = %control_plane.endpoint(), "Waiting for control plane schemas");
        control_plane.wait_for_schemas().await?;
        self.enter(StartupPhase::ControlPlaneReady);

        let settings = MessageQueueSettings::resolve(&self.environment);
        self.enter(StartupPhase::ConfigResolved);

        let secrets = match settings.secrets_dir() {
            Some(dir) => load_secrets(dir)?,
            None => {
                debug!("No message queue secrets directory configured");
                CredentialMap::new()
            }
        };
        self.enter(StartupPhase::SecretsLoaded);

        let queue = self
            .registry
            .create(&self.router_url, settings.into_config(secrets))
            .map_err(Error::Backend)?;
        self.enter(StartupPhase::BackendConstructed);

        Ok((control_plane, queue))
    }
}
