// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytics events recorded by the orchestrator.

use chrono::{DateTime, Utc};
use leadwise_core::{LeadLevel, Tier};
use metrics::describe_counter;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Something that happened during a session.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnalyticsEvent {
    /// The user sent a message.
    MessageSent { chars: usize },
    /// A reply was finalized.
    ResponseCompleted {
        tier: Tier,
        provider: Option<String>,
        latency_ms: u64,
        chars: usize,
    },
    /// The user aborted an in-flight reply.
    ResponseCancelled,
    /// A lower tier answered because a higher one failed or was unavailable.
    FallbackUsed { from: Tier, to: Tier },
    /// The lead profile was rescored.
    LeadUpdated { score: f32, level: LeadLevel },
}

/// An event stamped with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AnalyticsEvent,
}

/// Registers metric descriptions. Call once after installing a recorder.
pub fn register_metrics() {
    describe_counter!("leadwise_analytics_events_total", "Analytics events recorded");
    describe_counter!("leadwise_fallbacks_total", "Replies served by a lower tier");
}

/// Mirrors an event onto the `metrics` facade.
pub(crate) fn record_metric(event: &AnalyticsEvent) {
    metrics::counter!("leadwise_analytics_events_total", "event" => event.to_string()).increment(1);
    if let AnalyticsEvent::FallbackUsed { to, .. } = event {
        metrics::counter!("leadwise_fallbacks_total", "tier" => to.to_string()).increment(1);
    }
}
