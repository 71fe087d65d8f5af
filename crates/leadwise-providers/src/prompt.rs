// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly: persona, knowledge, and visitor context.

use leadwise_config::LeadwiseConfig;
use leadwise_core::{ChatMessage, Role};
use leadwise_rag::KnowledgeBase;

/// Knowledge articles quoted in one prompt.
const PROMPT_DOCUMENTS: usize = 3;

const DEFAULT_PERSONA: &str = "You are {name}, the sales assistant for an AI automation \
agency that builds chatbots, lead qualification and workflow automation for small and \
mid-sized businesses. Be warm and concise: answer in under 120 words and ask at most one \
question per reply. Learn about the visitor's business, pain points, budget and timeline. \
Never invent prices or guarantees that are not in the knowledge below. When a visitor is \
ready, offer to book a free consultation.";

/// A prompt ready for a [`TextGenerator`](leadwise_core::TextGenerator).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPrompt {
    pub system: String,
    /// Conversation without system messages, capped to the history window.
    pub messages: Vec<ChatMessage>,
}

/// Builds system prompts and trims history.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
    knowledge: KnowledgeBase,
    min_confidence: f32,
    max_history: usize,
}

impl PromptBuilder {
    pub fn new(persona: impl Into<String>, knowledge: KnowledgeBase, min_confidence: f32, max_history: usize) -> Self {
        Self {
            persona: persona.into(),
            knowledge,
            min_confidence,
            max_history: max_history.max(1),
        }
    }

    pub fn from_config(config: &LeadwiseConfig) -> Self {
        let persona = config
            .agent
            .persona
            .clone()
            .unwrap_or_else(|| DEFAULT_PERSONA.replace("{name}", &config.agent.name));
        Self::new(
            persona,
            KnowledgeBase::default().with_top_k(config.rag.top_k),
            config.rag.min_confidence,
            config.server.max_history,
        )
    }

    /// Splits caller-supplied system messages into the prompt and caps the
    /// remaining history. Knowledge tagged with `industry` ranks higher.
    pub fn prepare(&self, messages: &[ChatMessage], industry: Option<&str>) -> PreparedPrompt {
        let (context, conversation): (Vec<&ChatMessage>, Vec<&ChatMessage>) =
            messages.iter().partition(|m| m.role == Role::System);
        let latest_user = conversation
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let mut system = self.persona.clone();
        let retrieval = self.knowledge.search(latest_user, industry);
        if !retrieval.prefer_rules(self.min_confidence) {
            system.push_str("\n\nRelevant knowledge:");
            for scored in retrieval.matches.iter().take(PROMPT_DOCUMENTS) {
                system.push_str(&format!(
                    "\n- {}: {}",
                    scored.document.title, scored.document.content
                ));
            }
        }
        if !context.is_empty() {
            system.push_str("\n\nVisitor context:");
            for message in context {
                system.push('\n');
                system.push_str(message.content.trim());
            }
        }

        PreparedPrompt {
            system,
            messages: cap_history(&conversation, self.max_history)
                .iter()
                .map(|m| (*m).clone())
                .collect(),
        }
    }
}

/// The last `max` entries.
pub fn cap_history<T>(messages: &[T], max: usize) -> &[T] {
    &messages[messages.len().saturating_sub(max)..]
}
