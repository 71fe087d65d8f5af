// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Leadwise sales assistant.
//!
//! Layered TOML loading with strict key checking (`deny_unknown_fields`),
//! environment overrides, and miette diagnostics with typo suggestions.
//!
//! ```no_run
//! use leadwise_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.server.bind_address, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AgentConfig, ClientConfig, LeadwiseConfig, LocalConfig, ProviderConfig, ProvidersConfig,
    RagConfig, RetryConfig, RulesConfig, ServerConfig,
};

/// Loads the layered configuration and validates it.
pub fn load_and_validate() -> Result<LeadwiseConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Loads an explicit config file (plus env overrides) and validates it.
pub fn load_and_validate_path(path: &Path) -> Result<LeadwiseConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Loads a TOML string and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<LeadwiseConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<LeadwiseConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<LeadwiseConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                configured_providers = configured_provider_count(&config),
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

fn configured_provider_count(config: &LeadwiseConfig) -> usize {
    let p = &config.providers;
    [&p.groq, &p.together, &p.openai, &p.anthropic]
        .into_iter()
        .filter(|provider| provider.is_configured())
        .count()
}

/// Reads every existing config file for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_paths()
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
