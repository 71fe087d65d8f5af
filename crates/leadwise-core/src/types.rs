// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared data model: sessions, turns, insights, business and lead profiles.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier for one visitor's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Session bookkeeping: creation and last-activity times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Creates a session whose creation and activity times are `now`.
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            last_activity: now,
        }
    }

    /// Records activity. Never moves the activity clock backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }
}

/// Author of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A normalized `{role, content}` message exchanged with inference backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Inference backend class, ordered best quality first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    /// Hosted inference through the provider fallback chain.
    Remote,
    /// On-device inference through the local runtime.
    Local,
    /// Deterministic canned replies.
    Rules,
}

/// Coarse intent derived from a user message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    Greeting,
    Pricing,
    Leads,
    Scheduling,
    Support,
    Automation,
    Integration,
    General,
}

/// Lexicon-based sentiment of a user message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// One completed exchange: the user's text and the assistant's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_text: String,
    pub ai_text: String,
    pub timestamp: DateTime<Utc>,
    pub intent: Intent,
    pub sentiment: Sentiment,
}

/// The fixed set of fact types the memory store extracts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InsightType {
    BusinessNeed,
    PainPoint,
    Budget,
    Timeline,
    DecisionMaker,
}

impl InsightType {
    pub const ALL: [InsightType; 5] = [
        InsightType::BusinessNeed,
        InsightType::PainPoint,
        InsightType::Budget,
        InsightType::Timeline,
        InsightType::DecisionMaker,
    ];
}

/// A typed fact extracted from user text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub value: String,
    /// Fixed per-detector weight in `[0, 1]`.
    pub confidence: f32,
    /// Index of the turn the fact came from.
    pub source_turn: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BudgetBand {
    High,
    Medium,
    Low,
}

/// A stated budget and the band it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub raw: String,
    pub band: BudgetBand,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimelineBand {
    /// ASAP, this week.
    Immediate,
    /// Within roughly a month.
    ShortTerm,
    /// A quarter or a few months out.
    MediumTerm,
    /// Six months or more, or undecided.
    LongTerm,
}

/// A stated timeline and the band it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub raw: String,
    pub band: TimelineBand,
}

impl Timeline {
    /// Immediate and short-term timelines count as "near".
    pub fn is_near(&self) -> bool {
        matches!(self.band, TimelineBand::Immediate | TimelineBand::ShortTerm)
    }
}

/// Aggregated business facts for one session.
///
/// Pain points and needs only accumulate. Scalar fields are last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub pain_points: BTreeSet<String>,
    pub needs: BTreeSet<String>,
    pub budget: Option<Budget>,
    pub timeline: Option<Timeline>,
    pub decision_maker: bool,
    pub industry: Option<String>,
    pub company_size: Option<u32>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeadLevel {
    Hot,
    Warm,
    Cold,
}

impl LeadLevel {
    /// Thresholds a 0-10 score: hot at 8 and above, warm at 6 and above.
    pub fn from_score(score: f32) -> Self {
        if score >= 8.0 {
            LeadLevel::Hot
        } else if score >= 6.0 {
            LeadLevel::Warm
        } else {
            LeadLevel::Cold
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl From<LeadLevel> for Priority {
    fn from(level: LeadLevel) -> Self {
        match level {
            LeadLevel::Hot => Priority::High,
            LeadLevel::Warm => Priority::Medium,
            LeadLevel::Cold => Priority::Low,
        }
    }
}

/// The six qualification factors, each in `[0, 10]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub budget: f32,
    pub urgency: f32,
    pub authority: f32,
    pub need: f32,
    pub timeline: f32,
    pub engagement: f32,
}

impl FactorBreakdown {
    pub fn values(&self) -> [f32; 6] {
        [
            self.budget,
            self.urgency,
            self.authority,
            self.need,
            self.timeline,
            self.engagement,
        ]
    }

    /// Unweighted mean of the six factors.
    pub fn average(&self) -> f32 {
        self.values().iter().sum::<f32>() / 6.0
    }
}

/// Sales-readiness for one session. Always recomputed, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadProfile {
    pub score: f32,
    pub level: LeadLevel,
    pub factors: FactorBreakdown,
    pub priority: Priority,
    pub next_steps: Vec<String>,
}
