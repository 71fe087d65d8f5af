// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote provider identities and their fixed priority.

use leadwise_config::{ProviderConfig, ProvidersConfig};
use strum::{Display, EnumString};

/// Streaming wire format a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// Chat completions SSE terminated by `data: [DONE]`.
    OpenAiCompatible,
    /// Messages API SSE with typed events.
    Anthropic,
}

/// A remote inference provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderId {
    Groq,
    Together,
    Openai,
    Anthropic,
}

impl ProviderId {
    /// Fastest and cheapest first.
    pub const PRIORITY: [ProviderId; 4] = [
        ProviderId::Groq,
        ProviderId::Together,
        ProviderId::Openai,
        ProviderId::Anthropic,
    ];

    pub fn wire_format(self) -> WireFormat {
        match self {
            ProviderId::Anthropic => WireFormat::Anthropic,
            _ => WireFormat::OpenAiCompatible,
        }
    }

    pub fn config(self, providers: &ProvidersConfig) -> &ProviderConfig {
        match self {
            ProviderId::Groq => &providers.groq,
            ProviderId::Together => &providers.together,
            ProviderId::Openai => &providers.openai,
            ProviderId::Anthropic => &providers.anthropic,
        }
    }

    /// Configured providers in priority order.
    pub fn configured(providers: &ProvidersConfig) -> Vec<ProviderId> {
        Self::PRIORITY
            .into_iter()
            .filter(|id| id.config(providers).is_configured())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_keeps_priority_order() {
        let mut providers = ProvidersConfig::default();
        assert!(ProviderId::configured(&providers).is_empty());
        providers.anthropic.api_key = Some("sk-ant".into());
        providers.together.api_key = Some("tg".into());
        providers.openai.api_key = Some("   ".into());
        assert_eq!(
            ProviderId::configured(&providers),
            vec![ProviderId::Together, ProviderId::Anthropic]
        );
    }

    #[test]
    fn names_and_formats() {
        assert_eq!(ProviderId::Openai.to_string(), "openai");
        assert_eq!("groq".parse::<ProviderId>().unwrap(), ProviderId::Groq);
        assert_eq!(ProviderId::Anthropic.wire_format(), WireFormat::Anthropic);
        assert_eq!(ProviderId::Together.wire_format(), WireFormat::OpenAiCompatible);
    }
}
