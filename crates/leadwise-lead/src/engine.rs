// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead qualification: a pure scoring function plus a per-session engine.

use std::sync::Arc;

use leadwise_core::{
    BusinessProfile, ConversationTurn, FactorBreakdown, InMemoryStore, Insight, LeadLevel,
    LeadProfile, LeadwiseError, Priority, SessionId, SessionStore,
};
use leadwise_memory::ConversationMemory;
use tracing::{debug, info};

use crate::factors;
use crate::next_steps::next_steps;

/// Scores a session from its profile and history. No I/O, no hidden state.
pub fn qualify(
    profile: &BusinessProfile,
    turns: &[ConversationTurn],
    insights: &[Insight],
) -> LeadProfile {
    let factors = FactorBreakdown {
        budget: factors::budget(profile),
        urgency: factors::urgency(profile, turns),
        authority: factors::authority(profile),
        need: factors::need(profile),
        timeline: factors::timeline(profile),
        engagement: factors::engagement(turns, insights),
    };
    let score = round_one_decimal(factors.average().clamp(0.0, 10.0));
    let level = LeadLevel::from_score(score);
    LeadProfile {
        score,
        level,
        factors,
        priority: Priority::from(level),
        next_steps: next_steps(level, profile),
    }
}

fn round_one_decimal(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Recomputes and stores each session's [`LeadProfile`].
#[derive(Clone)]
pub struct LeadQualifier {
    memory: ConversationMemory,
    leads: Arc<dyn SessionStore<LeadProfile>>,
}

impl LeadQualifier {
    pub fn new(memory: ConversationMemory, leads: Arc<dyn SessionStore<LeadProfile>>) -> Self {
        Self { memory, leads }
    }

    /// An engine over an in-memory lead store.
    pub fn in_memory(memory: ConversationMemory) -> Self {
        Self::new(memory, Arc::new(InMemoryStore::new()))
    }

    /// Rescores `session` from current memory and stores the result.
    pub async fn update_lead(&self, session: &SessionId) -> Result<LeadProfile, LeadwiseError> {
        let lead = match self.memory.get_context(session).await? {
            Some(ctx) => qualify(&ctx.profile, &ctx.turns, &ctx.insights),
            None => qualify(&BusinessProfile::default(), &[], &[]),
        };

        let previous = self.leads.get(session).await?;
        if previous.as_ref().map(|p| p.level) != Some(lead.level) {
            info!(session_id = %session, score = lead.score, level = %lead.level, "lead level changed");
        } else {
            debug!(session_id = %session, score = lead.score, "lead rescored");
        }

        self.leads.put(session, lead.clone()).await?;
        Ok(lead)
    }

    /// The last stored profile for `session`.
    pub async fn get_lead(&self, session: &SessionId) -> Result<Option<LeadProfile>, LeadwiseError> {
        self.leads.get(session).await
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }
}
