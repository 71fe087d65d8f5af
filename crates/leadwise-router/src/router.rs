// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier selection: remote first, then local, then rules.

use std::sync::Arc;
use std::time::Duration;

use leadwise_config::{ClientConfig, LocalConfig};
use leadwise_core::{LeadwiseError, Tier};
use serde::Serialize;
use tracing::debug;

use crate::probe::{HttpRemoteProbe, LocalCapability, OllamaCapability, RemoteProbe};

/// The router's decision for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelChoice {
    pub tier: Tier,
    /// Provider named by the probe, when known.
    pub provider: Option<String>,
    pub reason: &'static str,
}

/// Chooses the best inference tier that is currently reachable.
#[derive(Clone)]
pub struct ModelRouter {
    remote: Arc<dyn RemoteProbe>,
    local: Arc<dyn LocalCapability>,
    remote_enabled: bool,
    local_opt_out: bool,
}

impl ModelRouter {
    pub fn new(remote: Arc<dyn RemoteProbe>, local: Arc<dyn LocalCapability>) -> Self {
        Self {
            remote,
            local,
            remote_enabled: true,
            local_opt_out: false,
        }
    }

    /// Builds a router with HTTP probes from client and local settings.
    pub fn from_config(client: &ClientConfig, local: &LocalConfig) -> Result<Self, LeadwiseError> {
        let remote = HttpRemoteProbe::new(client)?;
        let capability = OllamaCapability::new(local, Duration::from_millis(client.probe_timeout_ms))?;
        Ok(Self::new(Arc::new(remote), Arc::new(capability))
            .with_remote_enabled(client.remote_enabled)
            .with_local_opt_out(local.opt_out))
    }

    pub fn with_remote_enabled(mut self, enabled: bool) -> Self {
        self.remote_enabled = enabled;
        self
    }

    pub fn with_local_opt_out(mut self, opt_out: bool) -> Self {
        self.local_opt_out = opt_out;
        self
    }

    /// True when the local tier may be used at all.
    pub async fn local_available(&self) -> bool {
        !self.local_opt_out && self.local.available().await
    }

    pub fn local_name(&self) -> &str {
        self.local.name()
    }

    /// Picks a tier. Never fails: an unreachable probe still selects remote,
    /// since the real request is the authority.
    pub async fn choose_model(&self) -> ModelChoice {
        let choice = if self.remote_enabled {
            match self.remote.probe().await {
                Ok(report) if report.remote_available => Some(ModelChoice {
                    tier: Tier::Remote,
                    provider: report.primary,
                    reason: "remote healthy",
                }),
                Ok(_) => None,
                Err(e) => {
                    debug!(error = %e, "health probe failed, trying remote anyway");
                    Some(ModelChoice {
                        tier: Tier::Remote,
                        provider: None,
                        reason: "probe failed",
                    })
                }
            }
        } else {
            None
        };

        let choice = match choice {
            Some(choice) => choice,
            None => self.without_remote().await,
        };
        debug!(
            tier = %choice.tier,
            provider = choice.provider.as_deref().unwrap_or("-"),
            reason = choice.reason,
            "model chosen"
        );
        choice
    }

    async fn without_remote(&self) -> ModelChoice {
        if self.local_opt_out {
            return ModelChoice {
                tier: Tier::Rules,
                provider: None,
                reason: "local opted out",
            };
        }
        if self.local.available().await {
            ModelChoice {
                tier: Tier::Local,
                provider: Some(self.local.name().to_string()),
                reason: "remote unavailable",
            }
        } else {
            ModelChoice {
                tier: Tier::Rules,
                provider: None,
                reason: "no model available",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::HealthReport;
    use async_trait::async_trait;

    enum Remote {
        Healthy,
        NothingConfigured,
        Down,
    }

    #[async_trait]
    impl RemoteProbe for Remote {
        async fn probe(&self) -> Result<HealthReport, LeadwiseError> {
            match self {
                Remote::Healthy => Ok(HealthReport {
                    status: "ok".into(),
                    remote_available: true,
                    providers: vec!["groq".into()],
                    primary: Some("groq".into()),
                }),
                Remote::NothingConfigured => Ok(HealthReport {
                    status: "degraded".into(),
                    remote_available: false,
                    providers: Vec::new(),
                    primary: None,
                }),
                Remote::Down => Err(LeadwiseError::transient("connection refused")),
            }
        }
    }

    struct Local(bool);

    #[async_trait]
    impl LocalCapability for Local {
        fn name(&self) -> &str {
            "ollama"
        }

        async fn available(&self) -> bool {
            self.0
        }
    }

    fn router(remote: Remote, local: bool) -> ModelRouter {
        ModelRouter::new(Arc::new(remote), Arc::new(Local(local)))
    }

    #[tokio::test]
    async fn healthy_remote_wins() {
        let choice = router(Remote::Healthy, true).choose_model().await;
        assert_eq!(choice.tier, Tier::Remote);
        assert_eq!(choice.provider.as_deref(), Some("groq"));
    }

    #[tokio::test]
    async fn probe_failure_still_prefers_remote() {
        let choice = router(Remote::Down, true).choose_model().await;
        assert_eq!(choice.tier, Tier::Remote);
        assert!(choice.provider.is_none());
    }

    #[tokio::test]
    async fn unconfigured_remote_uses_local_then_rules() {
        let local = router(Remote::NothingConfigured, true).choose_model().await;
        assert_eq!(local.tier, Tier::Local);
        assert_eq!(local.provider.as_deref(), Some("ollama"));

        let rules = router(Remote::NothingConfigured, false).choose_model().await;
        assert_eq!(rules.tier, Tier::Rules);
    }

    #[tokio::test]
    async fn opt_out_skips_local() {
        let router = router(Remote::NothingConfigured, true).with_local_opt_out(true);
        assert_eq!(router.choose_model().await.tier, Tier::Rules);
        assert!(!router.local_available().await);
    }

    #[tokio::test]
    async fn disabled_remote_is_unreachable() {
        let router = router(Remote::Healthy, false).with_remote_enabled(false);
        assert_eq!(router.choose_model().await.tier, Tier::Rules);
    }
}
