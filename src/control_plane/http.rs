//! HTTP control plane client.
//!
//! Readiness is read from `GET {base}/v1/schemas`, which answers with the
//! schema names installed so far:
//!
//! ```json
//! {"installed": ["environments", "functions", "messagequeuetriggers", "packages"]}
//! ```
//!
//! The client polls at a fixed interval for as long as it takes. Unreachable
//! or unhealthy control planes are retried; a success response that cannot
//! be decoded means the endpoint is not a control plane and is reported.

use super::{missing_schemas, ControlPlane, ControlPlaneError};
use crate::config::ControlPlaneConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Per-request timeout; the overall wait is unbounded.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SchemaList {
    installed: Vec<String>,
}

/// Control plane reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpControlPlane {
    endpoint: String,
    schemas_url: Url,
    client: reqwest::Client,
    poll_interval: Duration,
}

impl HttpControlPlane {
    /// Build a client for the control plane at `config.url`.
    ///
    /// No request is made until [`ControlPlane::wait_for_schemas`].
    pub fn connect(config: &ControlPlaneConfig) -> Result<Self, ControlPlaneError> {
        let mut base = Url::parse(&config.url)
            .map_err(|e| ControlPlaneError::invalid_endpoint(&config.url, e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ControlPlaneError::invalid_endpoint(
                &config.url,
                "scheme must be http or https",
            ));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let schemas_url = base
            .join("v1/schemas")
            .map_err(|e| ControlPlaneError::invalid_endpoint(&config.url, e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ControlPlaneError::Client)?;

        Ok(Self {
            endpoint: config.url.clone(),
            schemas_url,
            client,
            poll_interval: config.poll_interval(),
        })
    }

    /// URL polled for installed schemas
    pub fn schemas_url(&self) -> &Url {
        &self.schemas_url
    }

    /// One readiness check. `Ok(None)` means "ask again later".
    async fn installed_schemas(&self) -> Result<Option<Vec<String>>, ControlPlaneError> {
        let response = match self.client.get(self.schemas_url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, url = %self.schemas_url, "Control plane unreachable");
                return Ok(None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, url = %self.schemas_url, "Control plane not ready");
            return Ok(None);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "Failed to read control plane response");
                return Ok(None);
            }
        };

        let list: SchemaList = serde_json::from_slice(&body).map_err(|e| {
            ControlPlaneError::invalid_response(format!(
                "{} did not return a schema list: {}",
                self.schemas_url, e
            ))
        })?;
        Ok(Some(list.installed))
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn wait_for_schemas(&self) -> Result<(), ControlPlaneError> {
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            if let Some(installed) = self.installed_schemas().await? {
                let missing = missing_schemas(installed.as_slice());
                if missing.is_empty() {
                    info!(endpoint = %self.endpoint, attempts, "Control plane schemas installed");
                    return Ok(());
                }
                debug!(missing = ?missing, "Waiting for control plane schemas");
            }

            // Surface long waits without flooding the log.
            if attempts % 30 == 0 {
                warn!(
                    endpoint = %self.endpoint,
                    attempts,
                    "Still waiting for control plane schemas"
                );
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
