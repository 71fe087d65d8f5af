// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{LeadwiseConfig, ProviderConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Maximum attempts against the primary provider.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Validates semantic constraints, collecting every failure.
pub fn validate_config(config: &LeadwiseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::validation("server.bind_address must not be empty"));
    } else {
        let is_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "server.bind_address `{addr}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.max_history == 0 {
        errors.push(ConfigError::validation("server.max_history must be at least 1"));
    }

    let providers = [
        ("groq", &config.providers.groq),
        ("together", &config.providers.together),
        ("openai", &config.providers.openai),
        ("anthropic", &config.providers.anthropic),
    ];
    for (name, provider) in providers {
        validate_provider(name, provider, &mut errors);
    }

    if config.retry.attempts == 0 || config.retry.attempts > MAX_RETRY_ATTEMPTS {
        errors.push(ConfigError::validation(format!(
            "retry.attempts must be between 1 and {MAX_RETRY_ATTEMPTS}, got {}",
            config.retry.attempts
        )));
    }
    if config.retry.timeout_secs == 0 {
        errors.push(ConfigError::validation("retry.timeout_secs must be at least 1"));
    }

    check_url("client.server_url", &config.client.server_url, &mut errors);
    if config.client.flush_interval_ms == 0 {
        errors.push(ConfigError::validation("client.flush_interval_ms must be at least 1"));
    }
    if config.client.probe_timeout_ms == 0 {
        errors.push(ConfigError::validation("client.probe_timeout_ms must be at least 1"));
    }

    check_url("local.endpoint", &config.local.endpoint, &mut errors);

    if config.rules.history_size == 0 {
        errors.push(ConfigError::validation("rules.history_size must be at least 1"));
    }
    if !config.rules.contact_email.contains('@') {
        errors.push(ConfigError::validation(format!(
            "rules.contact_email `{}` is not an email address",
            config.rules.contact_email
        )));
    }

    if !(0.0..=1.0).contains(&config.rag.min_confidence) {
        errors.push(ConfigError::validation(format!(
            "rag.min_confidence must be within [0, 1], got {}",
            config.rag.min_confidence
        )));
    }
    if config.rag.top_k == 0 {
        errors.push(ConfigError::validation("rag.top_k must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_provider(name: &str, provider: &ProviderConfig, errors: &mut Vec<ConfigError>) {
    check_url(&format!("providers.{name}.base_url"), &provider.base_url, errors);
    if provider.model.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "providers.{name}.model must not be empty"
        )));
    }
    if provider.max_tokens == 0 {
        errors.push(ConfigError::validation(format!(
            "providers.{name}.max_tokens must be at least 1"
        )));
    }
}

fn check_url(key: &str, value: &str, errors: &mut Vec<ConfigError>) {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "{key} `{value}` must start with http:// or https://"
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&LeadwiseConfig::default()).is_ok());
    }

    #[test]
    fn retry_attempts_capped_at_three() {
        let mut config = LeadwiseConfig::default();
        config.retry.attempts = 4;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "retry.attempts"));
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut config = LeadwiseConfig::default();
        config.retry.attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn collects_every_error() {
        let mut config = LeadwiseConfig::default();
        config.server.bind_address = String::new();
        config.client.server_url = "localhost:3000".to_string();
        config.rag.min_confidence = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_message(&errors, "server.bind_address"));
        assert!(has_message(&errors, "client.server_url"));
        assert!(has_message(&errors, "rag.min_confidence"));
    }

    #[test]
    fn bad_provider_url_names_the_provider() {
        let mut config = LeadwiseConfig::default();
        config.providers.together.base_url = "ftp://example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "providers.together.base_url"));
    }

    #[test]
    fn unknown_log_level_rejected() {
        let mut config = LeadwiseConfig::default();
        config.agent.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "agent.log_level"));
    }
}
