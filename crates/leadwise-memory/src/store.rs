// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-keyed conversation memory.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadwise_core::{
    BusinessProfile, ConversationTurn, InMemoryStore, Insight, InsightType, LeadwiseError,
    Session, SessionId, SessionStore,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::digest;
use crate::extractor::{self, parse_budget, parse_timeline};
use crate::signals::{detect_company, detect_intent, detect_sentiment};

/// Everything remembered about one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMemory {
    pub session: Session,
    pub turns: Vec<ConversationTurn>,
    /// Every extracted insight, oldest first.
    pub insights: Vec<Insight>,
    pub profile: BusinessProfile,
}

impl SessionMemory {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            session: Session::new(id, now),
            turns: Vec::new(),
            insights: Vec::new(),
            profile: BusinessProfile::default(),
        }
    }

    /// The most recent insight of `kind`.
    pub fn latest(&self, kind: InsightType) -> Option<&Insight> {
        self.insights.iter().rev().find(|i| i.kind == kind)
    }

    /// Distinct insight types seen so far.
    pub fn insight_types(&self) -> usize {
        InsightType::ALL
            .iter()
            .filter(|kind| self.latest(**kind).is_some())
            .count()
    }

    /// Appends a turn and folds its insights into the profile.
    ///
    /// Timestamps are clamped so turn order stays monotonic.
    fn apply_turn(&mut self, mut turn: ConversationTurn) -> Vec<Insight> {
        if let Some(last) = self.turns.last() {
            if turn.timestamp < last.timestamp {
                turn.timestamp = last.timestamp;
            }
        }
        let index = self.turns.len();
        let now = turn.timestamp;
        let insights = extractor::extract_insights(&turn.user_text, index, now);

        for insight in &insights {
            match insight.kind {
                InsightType::BusinessNeed => {
                    self.profile.needs.insert(insight.value.to_lowercase());
                }
                InsightType::PainPoint => {
                    self.profile.pain_points.insert(insight.value.to_lowercase());
                }
                InsightType::Budget => {
                    self.profile.budget = parse_budget(&turn.user_text);
                }
                InsightType::Timeline => {
                    self.profile.timeline = parse_timeline(&turn.user_text);
                }
                InsightType::DecisionMaker => self.profile.decision_maker = true,
            }
        }

        let company = detect_company(&turn.user_text);
        if company.industry.is_some() {
            self.profile.industry = company.industry;
        }
        if company.company_size.is_some() {
            self.profile.company_size = company.company_size;
        }

        self.session.touch(now);
        self.turns.push(turn);
        self.insights.extend(insights.iter().cloned());
        insights
    }
}

/// Builds a turn with intent and sentiment derived from the user text.
pub fn new_turn(user_text: &str, ai_text: &str, now: DateTime<Utc>) -> ConversationTurn {
    ConversationTurn {
        user_text: user_text.to_string(),
        ai_text: ai_text.to_string(),
        timestamp: now,
        intent: detect_intent(user_text),
        sentiment: detect_sentiment(user_text),
    }
}

/// Conversation memory over an injectable [`SessionStore`].
#[derive(Clone)]
pub struct ConversationMemory {
    store: Arc<dyn SessionStore<SessionMemory>>,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

impl ConversationMemory {
    pub fn new(store: Arc<dyn SessionStore<SessionMemory>>) -> Self {
        Self { store }
    }

    /// Records a completed turn and returns the insights it produced.
    ///
    /// The session is created on its first turn.
    pub async fn add_turn(
        &self,
        session: &SessionId,
        turn: ConversationTurn,
    ) -> Result<Vec<Insight>, LeadwiseError> {
        let mut memory = match self.store.get(session).await? {
            Some(memory) => memory,
            None => SessionMemory::new(session.clone(), turn.timestamp),
        };
        let insights = memory.apply_turn(turn);
        debug!(
            session_id = %session,
            turns = memory.turns.len(),
            new_insights = insights.len(),
            "turn added to memory"
        );
        self.store.put(session, memory).await?;
        Ok(insights)
    }

    /// Convenience wrapper that builds the turn from raw text.
    pub async fn record_exchange(
        &self,
        session: &SessionId,
        user_text: &str,
        ai_text: &str,
    ) -> Result<Vec<Insight>, LeadwiseError> {
        self.add_turn(session, new_turn(user_text, ai_text, Utc::now()))
            .await
    }

    /// Full memory snapshot for a session.
    pub async fn get_context(
        &self,
        session: &SessionId,
    ) -> Result<Option<SessionMemory>, LeadwiseError> {
        self.store.get(session).await
    }

    /// Bounded textual digest for prompt construction. Empty for unknown sessions.
    pub async fn get_relevant_context(
        &self,
        session: &SessionId,
        query: &str,
    ) -> Result<String, LeadwiseError> {
        Ok(self
            .store
            .get(session)
            .await?
            .map(|memory| digest::render(&memory, query))
            .unwrap_or_default())
    }

    /// Known sessions, sorted.
    pub async fn sessions(&self) -> Result<Vec<SessionId>, LeadwiseError> {
        self.store.sessions().await
    }
}
