// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event log plus the reducers over memory and lead state.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use leadwise_core::{InMemoryStore, LeadwiseError, SessionId, SessionStore};
use leadwise_lead::LeadQualifier;
use tracing::debug;

use crate::events::{AnalyticsEvent, EventRecord, record_metric};
use crate::report::{self, BusinessReport, SessionRow};
use crate::snapshot::{self, AnalyticsSnapshot};

/// Records events and derives session and business views.
///
/// Reads memory and lead state through the qualifier; never writes them.
#[derive(Clone)]
pub struct Analytics {
    leads: LeadQualifier,
    events: Arc<dyn SessionStore<Vec<EventRecord>>>,
}

impl Analytics {
    pub fn new(leads: LeadQualifier, events: Arc<dyn SessionStore<Vec<EventRecord>>>) -> Self {
        Self { leads, events }
    }

    pub fn in_memory(leads: LeadQualifier) -> Self {
        Self::new(leads, Arc::new(InMemoryStore::new()))
    }

    /// Appends an event to the session's ordered log.
    pub async fn record(
        &self,
        session: &SessionId,
        event: AnalyticsEvent,
    ) -> Result<(), LeadwiseError> {
        record_metric(&event);
        debug!(session_id = %session, event = %event, "analytics event");
        let mut log = self.events.get(session).await?.unwrap_or_default();
        log.push(EventRecord {
            timestamp: Utc::now(),
            event,
        });
        self.events.put(session, log).await
    }

    /// The session's events, oldest first.
    pub async fn events(&self, session: &SessionId) -> Result<Vec<EventRecord>, LeadwiseError> {
        Ok(self.events.get(session).await?.unwrap_or_default())
    }

    pub async fn snapshot(&self, session: &SessionId) -> Result<AnalyticsSnapshot, LeadwiseError> {
        let memory = self.leads.memory().get_context(session).await?;
        let lead = self.leads.get_lead(session).await?;
        let events = self.events(session).await?;
        Ok(snapshot::build(session, memory.as_ref(), lead.as_ref(), &events))
    }

    /// Report across every session seen by memory or the event log.
    pub async fn report(&self) -> Result<BusinessReport, LeadwiseError> {
        let mut sessions: BTreeSet<SessionId> =
            self.leads.memory().sessions().await?.into_iter().collect();
        sessions.extend(self.events.sessions().await?);

        let mut collected = Vec::with_capacity(sessions.len());
        for session in &sessions {
            let memory = self.leads.memory().get_context(session).await?;
            let lead = self.leads.get_lead(session).await?;
            let events = self.events(session).await?;
            let snap = snapshot::build(session, memory.as_ref(), lead.as_ref(), &events);
            collected.push((memory.map(|m| m.profile).unwrap_or_default(), snap));
        }

        let rows: Vec<SessionRow<'_>> = collected
            .iter()
            .map(|(profile, snapshot)| SessionRow { profile, snapshot })
            .collect();
        Ok(report::build(&rows, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadwise_core::Tier;
    use leadwise_memory::ConversationMemory;

    fn analytics() -> (ConversationMemory, LeadQualifier, Analytics) {
        let memory = ConversationMemory::default();
        let leads = LeadQualifier::in_memory(memory.clone());
        let analytics = Analytics::in_memory(leads.clone());
        (memory, leads, analytics)
    }

    #[tokio::test]
    async fn events_keep_order() {
        let (_, _, analytics) = analytics();
        let id = SessionId::from("s");
        analytics
            .record(&id, AnalyticsEvent::MessageSent { chars: 5 })
            .await
            .unwrap();
        analytics
            .record(&id, AnalyticsEvent::FallbackUsed { from: Tier::Remote, to: Tier::Rules })
            .await
            .unwrap();
        let events = analytics.events(&id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].event, AnalyticsEvent::MessageSent { chars: 5 }));
        assert!(events[0].timestamp <= events[1].timestamp);
        let snap = analytics.snapshot(&id).await.unwrap();
        assert_eq!(snap.fallback_count, 1);
    }

    #[tokio::test]
    async fn snapshot_reflects_memory_and_lead() {
        let (memory, leads, analytics) = analytics();
        let id = SessionId::from("s");
        memory
            .record_exchange(&id, "I'm the owner, budget is $12k, but it's too expensive elsewhere", "ok")
            .await
            .unwrap();
        leads.update_lead(&id).await.unwrap();
        analytics
            .record(
                &id,
                AnalyticsEvent::ResponseCompleted {
                    tier: Tier::Remote,
                    provider: Some("groq".into()),
                    latency_ms: 300,
                    chars: 40,
                },
            )
            .await
            .unwrap();

        let snap = analytics.snapshot(&id).await.unwrap();
        assert_eq!(snap.message_count, 1);
        assert_eq!(snap.avg_latency_ms, Some(300));
        // high budget 4 + one pain point 0.5 + decision maker 1
        assert_eq!(snap.business_value, 5.5);
        assert!(snap.lead_score.is_some());
        assert!(snap.objections.contains(&crate::Objection::Price));
        assert!(!snap.recommendations.iter().any(|r| r == "Ask about budget range"));
    }

    #[tokio::test]
    async fn report_spans_sessions() {
        let (memory, leads, analytics) = analytics();
        for (id, text) in [("a", "we're a saas startup"), ("b", "we run a dental clinic"), ("c", "another saas team")] {
            let id = SessionId::from(id);
            memory.record_exchange(&id, text, "ok").await.unwrap();
            leads.update_lead(&id).await.unwrap();
        }
        analytics
            .record(&SessionId::from("events-only"), AnalyticsEvent::ResponseCancelled)
            .await
            .unwrap();

        let report = analytics.report().await.unwrap();
        assert_eq!(report.total_sessions, 4);
        assert_eq!(report.cold_leads, 3);
        assert_eq!(report.top_industries[0].value, "saas");
        assert_eq!(report.top_industries[0].sessions, 2);
        assert_eq!(report.hot_leads, 0);
    }
}
