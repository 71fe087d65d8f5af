// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health probes for the remote server and the local inference runtime.

use std::time::Duration;

use async_trait::async_trait;
use leadwise_config::{ClientConfig, LocalConfig};
use leadwise_core::LeadwiseError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    /// True when at least one remote provider is configured server-side.
    pub remote_available: bool,
    /// Configured providers in priority order.
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
}

/// Asks the chat server whether remote inference is available.
#[async_trait]
pub trait RemoteProbe: Send + Sync {
    async fn probe(&self) -> Result<HealthReport, LeadwiseError>;
}

/// Reports whether accelerated local inference can run here.
#[async_trait]
pub trait LocalCapability: Send + Sync {
    /// Identifier reported as the provider when the local tier is chosen.
    fn name(&self) -> &str;

    async fn available(&self) -> bool;
}

fn probe_client(timeout: Duration) -> Result<reqwest::Client, LeadwiseError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LeadwiseError::Internal(format!("failed to build HTTP client: {e}")))
}

/// Probes `{server_url}/api/health`.
#[derive(Debug, Clone)]
pub struct HttpRemoteProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpRemoteProbe {
    pub fn new(config: &ClientConfig) -> Result<Self, LeadwiseError> {
        Ok(Self {
            client: probe_client(Duration::from_millis(config.probe_timeout_ms))?,
            url: format!("{}/api/health", config.server_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl RemoteProbe for HttpRemoteProbe {
    async fn probe(&self) -> Result<HealthReport, LeadwiseError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LeadwiseError::transient(format!("health probe timed out: {e}"))
            } else {
                LeadwiseError::transient(format!("health probe failed: {e}"))
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(LeadwiseError::transient(format!(
                "health probe returned {status}"
            )));
        }
        response
            .json::<HealthReport>()
            .await
            .map_err(|e| LeadwiseError::transient(format!("malformed health report: {e}")))
    }
}

/// Detects an Ollama-compatible runtime by listing its models.
#[derive(Debug, Clone)]
pub struct OllamaCapability {
    client: reqwest::Client,
    tags_url: String,
    enabled: bool,
}

impl OllamaCapability {
    pub fn new(config: &LocalConfig, probe_timeout: Duration) -> Result<Self, LeadwiseError> {
        Ok(Self {
            client: probe_client(probe_timeout)?,
            tags_url: format!("{}/api/tags", config.endpoint.trim_end_matches('/')),
            enabled: config.enabled,
        })
    }
}

#[async_trait]
impl LocalCapability for OllamaCapability {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn available(&self) -> bool {
        if !self.enabled {
            return false;
        }
        match self.client.get(&self.tags_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "local runtime not reachable");
                false
            }
        }
    }
}
