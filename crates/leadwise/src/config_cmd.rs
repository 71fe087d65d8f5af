// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadwise config` command implementation.

use leadwise_config::{LeadwiseConfig, ProviderConfig};
use leadwise_core::LeadwiseError;

const REDACTED: &str = "[REDACTED]";

/// Prints the effective config as TOML.
pub fn print_config(config: &LeadwiseConfig) -> Result<(), LeadwiseError> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &LeadwiseConfig) -> Result<String, LeadwiseError> {
    toml::to_string_pretty(&redacted(config))
        .map_err(|e| LeadwiseError::Internal(format!("failed to render config: {e}")))
}

/// A copy with every API key replaced.
fn redacted(config: &LeadwiseConfig) -> LeadwiseConfig {
    let mut copy = config.clone();
    for provider in [
        &mut copy.providers.groq,
        &mut copy.providers.together,
        &mut copy.providers.openai,
        &mut copy.providers.anthropic,
    ] {
        redact(provider);
    }
    copy
}

fn redact(provider: &mut ProviderConfig) {
    if provider.api_key.is_some() {
        provider.api_key = Some(REDACTED.to_string());
    }
}
