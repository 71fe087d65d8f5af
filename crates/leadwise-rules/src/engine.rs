// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session responder with a rolling reply history.

use std::collections::VecDeque;
use std::sync::Arc;

use leadwise_core::{InMemoryStore, LeadwiseError, SessionId, SessionStore};
use leadwise_rag::{DEFAULT_MIN_CONFIDENCE, KnowledgeBase};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::families::{self, GREETING, RuleFamily};
use crate::overlap::overlaps;

/// Default number of recent replies checked for repetition.
pub const DEFAULT_HISTORY_SIZE: usize = 5;

/// What the engine remembers about one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyHistory {
    /// Messages answered so far.
    pub answered: usize,
    /// Most recent replies, oldest first.
    pub recent: VecDeque<String>,
}

impl ReplyHistory {
    fn remember(&mut self, reply: &str, capacity: usize) {
        self.answered += 1;
        self.recent.push_back(reply.to_string());
        while self.recent.len() > capacity {
            self.recent.pop_front();
        }
    }

    fn repeats(&self, candidate: &str) -> bool {
        self.recent.iter().any(|prior| overlaps(prior, candidate))
    }
}

/// What the caller knows about the session beyond the rules history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleContext<'a> {
    /// Exchanges already completed by any tier.
    pub prior_turns: usize,
    /// Industry the visitor has stated, used to rank knowledge.
    pub industry: Option<&'a str>,
}

/// A rules answer and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleReply {
    pub text: String,
    pub family: RuleFamily,
    /// Knowledge document the reply was taken from, if any.
    pub document: Option<String>,
}

/// Deterministic responder used when no model is available.
#[derive(Clone)]
pub struct RulesEngine {
    history: Arc<dyn SessionStore<ReplyHistory>>,
    history_size: usize,
    contact_email: String,
    knowledge: Option<KnowledgeBase>,
    min_confidence: f32,
}

impl RulesEngine {
    pub fn new(
        history: Arc<dyn SessionStore<ReplyHistory>>,
        history_size: usize,
        contact_email: impl Into<String>,
    ) -> Self {
        Self {
            history,
            history_size: history_size.max(1),
            contact_email: contact_email.into(),
            knowledge: None,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    pub fn in_memory(history_size: usize, contact_email: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), history_size, contact_email)
    }

    /// Answers unmatched messages from `knowledge` when a document is a
    /// confident match.
    pub fn with_knowledge(mut self, knowledge: KnowledgeBase, min_confidence: f32) -> Self {
        self.knowledge = Some(knowledge);
        self.min_confidence = min_confidence;
        self
    }

    /// Produces a non-empty reply and records it in the session history.
    ///
    /// Only the opening message of a conversation gets the greeting; a
    /// session that reaches the rules mid-conversation is answered directly.
    pub async fn respond(
        &self,
        session: &SessionId,
        text: &str,
        context: RuleContext<'_>,
    ) -> Result<RuleReply, LeadwiseError> {
        let mut history = self.history.get(session).await?.unwrap_or_default();
        let reply = self.choose(&history, text, context);
        debug!(
            session_id = %session,
            family = %reply.family,
            from_document = reply.document.is_some(),
            "rules reply"
        );
        history.remember(&reply.text, self.history_size);
        self.history.put(session, history).await?;
        Ok(reply)
    }

    fn choose(&self, history: &ReplyHistory, text: &str, context: RuleContext<'_>) -> RuleReply {
        if history.answered == 0 && context.prior_turns == 0 {
            return RuleReply {
                text: GREETING.to_string(),
                family: RuleFamily::Greeting,
                document: None,
            };
        }

        let family = families::classify(text);
        if family == RuleFamily::Fallback {
            if let Some(reply) = self.from_knowledge(history, text, context.industry) {
                return reply;
            }
        }

        let variants = families::replies(family);
        // Rotate the starting variant so consecutive answers differ even
        // when the history window has rolled past them.
        let start = history.answered % variants.len();
        let fresh = variants
            .iter()
            .cycle()
            .skip(start)
            .take(variants.len())
            .find(|v| !history.repeats(v));

        match fresh {
            Some(v) => RuleReply {
                text: (*v).to_string(),
                family,
                document: None,
            },
            None => RuleReply {
                text: families::contact_reply(&self.contact_email),
                family,
                document: None,
            },
        }
    }

    fn from_knowledge(
        &self,
        history: &ReplyHistory,
        text: &str,
        industry: Option<&str>,
    ) -> Option<RuleReply> {
        let knowledge = self.knowledge.as_ref()?;
        let retrieval = knowledge.search(text, industry);
        if retrieval.prefer_rules(self.min_confidence) {
            return None;
        }
        retrieval
            .matches
            .iter()
            .find(|m| !history.repeats(&m.document.content))
            .map(|m| RuleReply {
                text: m.document.content.clone(),
                family: RuleFamily::Fallback,
                document: Some(m.document.id.clone()),
            })
    }
}
