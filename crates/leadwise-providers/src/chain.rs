// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Priority-ordered provider chain with bounded retry.

use std::sync::Arc;
use std::time::Duration;

use futures::future::ready;
use futures::stream::{self, StreamExt};
use leadwise_config::{LeadwiseConfig, RetryConfig};
use leadwise_core::{ChatMessage, LeadwiseError, TextGenerator, TextStream};
use tracing::{debug, info, warn};

use crate::anthropic::AnthropicGenerator;
use crate::openai::OpenAiCompatibleGenerator;
use crate::provider::{ProviderId, WireFormat};

/// How hard the chain tries the primary provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Doubles after every failed attempt.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        }
    }
}

/// An open stream and the provider serving it.
pub struct ChainStream {
    pub provider: String,
    pub stream: TextStream,
}

impl std::fmt::Debug for ChainStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainStream")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// Primary provider with retry, then exactly one attempt on a secondary.
#[derive(Clone)]
pub struct ProviderChain {
    generators: Vec<Arc<dyn TextGenerator>>,
    policy: RetryPolicy,
}

impl ProviderChain {
    /// Generators in priority order. Only the first two are ever used.
    pub fn new(generators: Vec<Arc<dyn TextGenerator>>, policy: RetryPolicy) -> Self {
        Self { generators, policy }
    }

    /// Builds a client for every configured provider.
    pub fn from_config(config: &LeadwiseConfig) -> Result<Self, LeadwiseError> {
        let timeout = Duration::from_secs(config.retry.timeout_secs);
        let mut generators: Vec<Arc<dyn TextGenerator>> = Vec::new();
        for id in ProviderId::configured(&config.providers) {
            let provider = id.config(&config.providers);
            let generator: Arc<dyn TextGenerator> = match id.wire_format() {
                WireFormat::OpenAiCompatible => Arc::new(OpenAiCompatibleGenerator::new(
                    id.to_string(),
                    provider,
                    timeout,
                )?),
                WireFormat::Anthropic => Arc::new(AnthropicGenerator::new(provider, timeout)?),
            };
            generators.push(generator);
        }
        debug!(providers = generators.len(), "provider chain built");
        Ok(Self::new(generators, RetryPolicy::from(&config.retry)))
    }

    pub fn is_configured(&self) -> bool {
        !self.generators.is_empty()
    }

    /// Configured provider names in priority order.
    pub fn providers(&self) -> Vec<String> {
        self.generators.iter().map(|g| g.name().to_string()).collect()
    }

    pub fn primary(&self) -> Option<&str> {
        self.generators.first().map(|g| g.name())
    }

    /// Opens a stream on the first provider that produces text.
    ///
    /// Returns [`LeadwiseError::NoProviderConfigured`] when the chain is
    /// empty; callers treat that as "use local or rules".
    pub async fn stream(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<ChainStream, LeadwiseError> {
        let Some(primary) = self.generators.first() else {
            return Err(LeadwiseError::NoProviderConfigured);
        };

        let mut backoff = self.policy.initial_backoff;
        let mut last_error = None;
        for attempt in 1..=self.policy.attempts {
            match open(primary.as_ref(), messages, system_prompt).await {
                Ok(stream) => {
                    record_attempt(primary.name(), "success");
                    return Ok(ChainStream {
                        provider: primary.name().to_string(),
                        stream,
                    });
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    record_attempt(primary.name(), if retryable { "retryable_error" } else { "error" });
                    warn!(provider = primary.name(), attempt, retryable, error = %e, "provider attempt failed");
                    last_error = Some(e);
                    if !retryable || attempt == self.policy.attempts {
                        break;
                    }
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
            }
        }

        if let Some(secondary) = self.generators.get(1) {
            info!(from = primary.name(), to = secondary.name(), "falling back to secondary provider");
            metrics::counter!(
                "leadwise_provider_fallbacks_total",
                "from" => primary.name().to_string(),
                "to" => secondary.name().to_string()
            )
            .increment(1);
            match open(secondary.as_ref(), messages, system_prompt).await {
                Ok(stream) => {
                    record_attempt(secondary.name(), "success");
                    return Ok(ChainStream {
                        provider: secondary.name().to_string(),
                        stream,
                    });
                }
                Err(e) => {
                    record_attempt(secondary.name(), "error");
                    warn!(provider = secondary.name(), error = %e, "secondary provider failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LeadwiseError::Internal("provider chain made no attempt".into())))
    }
}

/// Starts generation and waits for the first non-empty chunk, so a stream
/// that fails immediately counts as a failed attempt.
async fn open(
    generator: &dyn TextGenerator,
    messages: &[ChatMessage],
    system_prompt: Option<&str>,
) -> Result<TextStream, LeadwiseError> {
    let mut stream = generator.generate(messages, system_prompt).await?;
    loop {
        match stream.next().await {
            Some(Ok(chunk)) if chunk.is_empty() => continue,
            Some(Ok(chunk)) => {
                let head = stream::once(ready(Ok(chunk)));
                return Ok(Box::pin(head.chain(stream)));
            }
            Some(Err(e)) => return Err(e),
            None => {
                return Err(LeadwiseError::transient(format!(
                    "{} returned an empty response",
                    generator.name()
                )));
            }
        }
    }
}

fn record_attempt(provider: &str, outcome: &'static str) {
    metrics::counter!(
        "leadwise_provider_attempts_total",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Registers descriptions for the chain's counters.
pub fn register_metrics() {
    metrics::describe_counter!(
        "leadwise_provider_attempts_total",
        "Provider stream attempts by outcome"
    );
    metrics::describe_counter!(
        "leadwise_provider_fallbacks_total",
        "Requests moved from the primary to the secondary provider"
    );
}
