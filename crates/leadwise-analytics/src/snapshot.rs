// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session metrics derived from memory, lead and event state.

use std::collections::BTreeSet;

use leadwise_core::{
    BudgetBand, BusinessProfile, ConversationTurn, Insight, LeadLevel, LeadProfile, SessionId, Tier,
};
use leadwise_lead::factors;
use leadwise_memory::SessionMemory;
use serde::{Deserialize, Serialize};

use crate::events::{AnalyticsEvent, EventRecord};
use crate::objections::{Objection, detect_objections};

/// Computed view of one session. Holds no facts of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub session_id: SessionId,
    pub message_count: usize,
    pub engagement: f32,
    pub business_value: f32,
    pub conversion_probability: f32,
    pub lead_score: Option<f32>,
    pub lead_level: Option<LeadLevel>,
    pub avg_latency_ms: Option<u64>,
    pub fallback_count: usize,
    pub cancelled_count: usize,
    pub objections: BTreeSet<Objection>,
    pub recommendations: Vec<String>,
}

/// Budget band, company size, pain points and authority, capped at 10.
pub fn business_value(profile: &BusinessProfile) -> f32 {
    let budget = match profile.budget.as_ref().map(|b| b.band) {
        Some(BudgetBand::High) => 4.0,
        Some(BudgetBand::Medium) => 2.5,
        Some(BudgetBand::Low) => 1.0,
        None => 0.0,
    };
    let size = match profile.company_size {
        Some(n) if n >= 50 => 2.0,
        Some(n) if n >= 10 => 1.0,
        _ => 0.0,
    };
    let pains = (profile.pain_points.len() as f32 * 0.5).min(2.0);
    let authority = if profile.decision_maker { 1.0 } else { 0.0 };
    (budget + size + pains + authority).min(10.0)
}

/// Scaled lead score plus authority and near-timeline bonuses, in `[0, 1]`.
pub fn conversion_probability(profile: &BusinessProfile, lead_score: f32) -> f32 {
    let mut p = lead_score / 10.0 * 0.7;
    if profile.decision_maker {
        p += 0.15;
    }
    if profile.timeline.as_ref().is_some_and(|t| t.is_near()) {
        p += 0.15;
    }
    p.clamp(0.0, 1.0)
}

/// Follow-up suggestions for gaps in what is known.
pub fn recommendations(
    profile: &BusinessProfile,
    lead: Option<&LeadProfile>,
    objections: &BTreeSet<Objection>,
) -> Vec<String> {
    let mut out = Vec::new();
    if lead.is_some_and(|l| l.level == LeadLevel::Hot) {
        out.push("Hand off to sales now".to_string());
    }
    if profile.budget.is_none() {
        out.push("Ask about budget range".to_string());
    }
    if profile.timeline.is_none() {
        out.push("Clarify the implementation timeline".to_string());
    }
    if !profile.decision_maker {
        out.push("Identify the decision maker".to_string());
    }
    if profile.pain_points.is_empty() {
        out.push("Explore current pain points".to_string());
    }
    for objection in objections {
        out.push(format!("Address {objection} concerns"));
    }
    out
}

/// Builds the snapshot. `memory` and `lead` may be missing for new sessions.
pub fn build(
    session_id: &SessionId,
    memory: Option<&SessionMemory>,
    lead: Option<&LeadProfile>,
    events: &[EventRecord],
) -> AnalyticsSnapshot {
    let empty = BusinessProfile::default();
    let profile = memory.map(|m| &m.profile).unwrap_or(&empty);
    let (turns, insights): (&[ConversationTurn], &[Insight]) = match memory {
        Some(m) => (m.turns.as_slice(), m.insights.as_slice()),
        None => (&[], &[]),
    };

    let objections: BTreeSet<Objection> = turns
        .iter()
        .flat_map(|t| detect_objections(&t.user_text))
        .collect();

    let latencies: Vec<u64> = events
        .iter()
        .filter_map(|r| match &r.event {
            AnalyticsEvent::ResponseCompleted {
                tier: Tier::Remote | Tier::Local,
                latency_ms,
                ..
            } => Some(*latency_ms),
            _ => None,
        })
        .collect();
    let avg_latency_ms = (!latencies.is_empty())
        .then(|| latencies.iter().sum::<u64>() / latencies.len() as u64);

    let count = |pred: fn(&AnalyticsEvent) -> bool| events.iter().filter(|r| pred(&r.event)).count();
    let message_count = count(|e| matches!(e, AnalyticsEvent::MessageSent { .. })).max(turns.len());

    let lead_score = lead.map(|l| l.score);
    AnalyticsSnapshot {
        session_id: session_id.clone(),
        message_count,
        engagement: factors::engagement(turns, insights),
        business_value: business_value(profile),
        conversion_probability: conversion_probability(profile, lead_score.unwrap_or(0.0)),
        lead_score,
        lead_level: lead.map(|l| l.level),
        avg_latency_ms,
        fallback_count: count(|e| matches!(e, AnalyticsEvent::FallbackUsed { .. })),
        cancelled_count: count(|e| matches!(e, AnalyticsEvent::ResponseCancelled)),
        recommendations: recommendations(profile, lead, &objections),
        objections,
    }
}
