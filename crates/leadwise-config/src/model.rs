// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Leadwise sales assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Leadwise configuration.
///
/// All sections are optional and default to values that run a local,
/// rules-only assistant with no credentials at all.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadwiseConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Chat gateway listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote inference providers, tried in fixed priority order.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Provider-chain retry policy.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Client-side orchestrator settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// On-device inference runtime.
    #[serde(default)]
    pub local: LocalConfig,

    /// Rules fallback engine.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Knowledge retrieval.
    #[serde(default)]
    pub rag: RagConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in the persona prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Replaces the built-in persona when set.
    #[serde(default)]
    pub persona: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            persona: None,
        }
    }
}

fn default_agent_name() -> String {
    "Leadwise".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of trailing messages forwarded upstream.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_history: default_max_history(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_history() -> usize {
    20
}

/// All remote providers. A provider takes part in the chain once it has a key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default = "default_groq")]
    pub groq: ProviderConfig,

    #[serde(default = "default_together")]
    pub together: ProviderConfig,

    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,

    #[serde(default = "default_anthropic")]
    pub anthropic: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            groq: default_groq(),
            together: default_together(),
            openai: default_openai(),
            anthropic: default_anthropic(),
        }
    }
}

fn default_groq() -> ProviderConfig {
    ProviderConfig::new("llama-3.1-8b-instant", "https://api.groq.com/openai/v1")
}

fn default_together() -> ProviderConfig {
    ProviderConfig::new(
        "meta-llama/Llama-3.2-3B-Instruct-Turbo",
        "https://api.together.xyz/v1",
    )
}

fn default_openai() -> ProviderConfig {
    ProviderConfig::new("gpt-4o-mini", "https://api.openai.com/v1")
}

fn default_anthropic() -> ProviderConfig {
    ProviderConfig::new("claude-3-5-haiku-latest", "https://api.anthropic.com/v1")
}

/// One remote provider's credentials and endpoint.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. `None` leaves the provider out of the chain.
    #[serde(default)]
    pub api_key: Option<String>,

    pub model: String,

    pub base_url: String,

    /// Upper bound on generated tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderConfig {
    fn new(model: &str, base_url: &str) -> Self {
        Self {
            api_key: None,
            model: model.to_string(),
            base_url: base_url.to_string(),
            max_tokens: default_max_tokens(),
        }
    }

    /// True when an API key is present and non-blank.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> u32 {
    1024
}

/// Provider-chain retry policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Attempts against the primary provider (1 to 3).
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// First backoff delay; doubles after each failed attempt.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Per-request timeout towards a provider.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_provider_timeout_secs() -> u64 {
    60
}

/// Settings for the conversation orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the chat gateway.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Display batching interval for remote streams.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Upper bound on the router's health probes.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// `false` skips the remote tier entirely.
    #[serde(default = "default_true")]
    pub remote_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            flush_interval_ms: default_flush_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            remote_enabled: true,
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_flush_interval_ms() -> u64 {
    50
}

fn default_probe_timeout_ms() -> u64 {
    1500
}

fn default_request_timeout_secs() -> u64 {
    90
}

fn default_true() -> bool {
    true
}

/// On-device inference runtime (Ollama-compatible).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocalConfig {
    /// `false` treats the runtime as unsupported.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// The user declined local inference.
    #[serde(default)]
    pub opt_out: bool,

    #[serde(default = "default_local_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_local_model")]
    pub model: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            opt_out: false,
            endpoint: default_local_endpoint(),
            model: default_local_model(),
        }
    }
}

fn default_local_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_local_model() -> String {
    "llama3.2:1b".to_string()
}

/// Rules fallback engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Prior replies remembered per session for repeat suppression.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Human contact channel offered when nothing else fits.
    #[serde(default = "default_contact_email")]
    pub contact_email: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            contact_email: default_contact_email(),
        }
    }
}

fn default_history_size() -> usize {
    5
}

fn default_contact_email() -> String {
    "hello@leadwise.dev".to_string()
}

/// Knowledge retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RagConfig {
    /// Below this confidence the rules engine is preferred.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            top_k: default_top_k(),
        }
    }
}

fn default_min_confidence() -> f32 {
    0.5
}

fn default_top_k() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_configured_provider() {
        let config = LeadwiseConfig::default();
        assert!(!config.providers.groq.is_configured());
        assert!(!config.providers.anthropic.is_configured());
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.client.flush_interval_ms, 50);
        assert_eq!(config.rules.history_size, 5);
    }

    #[test]
    fn blank_key_is_not_configured() {
        let mut provider = default_groq();
        provider.api_key = Some("   ".to_string());
        assert!(!provider.is_configured());
        provider.api_key = Some("gsk_live".to_string());
        assert!(provider.is_configured());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut provider = default_openai();
        provider.api_key = Some("sk-secret-value".to_string());
        let debug = format!("{provider:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret-value"));
    }

    #[test]
    fn partial_provider_section_keeps_defaults() {
        let toml_str = r#"
[providers.groq]
api_key = "gsk_1"
model = "llama-3.3-70b-versatile"
base_url = "https://api.groq.com/openai/v1"
"#;
        let config: LeadwiseConfig = toml::from_str(toml_str).unwrap();
        assert!(config.providers.groq.is_configured());
        assert_eq!(config.providers.groq.max_tokens, 1024);
        assert_eq!(config.providers.openai.model, "gpt-4o-mini");
    }
}
