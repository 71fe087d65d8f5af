// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Band tables for the six qualification factors. Every factor is in `[0, 10]`.

use std::collections::HashSet;

use leadwise_core::{BudgetBand, BusinessProfile, ConversationTurn, Insight, InsightType, TimelineBand};

/// Score for a factor with no supporting data.
pub const UNKNOWN: f32 = 2.0;

/// Words that signal urgency in user text.
const URGENCY_WORDS: &[&str] = &[
    "urgent", "asap", "immediately", "right away", "quickly", "soon", "deadline",
    "critical", "fast", "now",
];

pub fn budget(profile: &BusinessProfile) -> f32 {
    match profile.budget.as_ref().map(|b| b.band) {
        Some(BudgetBand::High) => 10.0,
        Some(BudgetBand::Medium) => 7.0,
        Some(BudgetBand::Low) => 4.0,
        None => UNKNOWN,
    }
}

/// Higher of the timeline band and the urgency language used.
pub fn urgency(profile: &BusinessProfile, turns: &[ConversationTurn]) -> f32 {
    let from_timeline = match profile.timeline.as_ref().map(|t| t.band) {
        Some(TimelineBand::Immediate) => 10.0,
        Some(TimelineBand::ShortTerm) => 8.0,
        Some(TimelineBand::MediumTerm) => 5.0,
        Some(TimelineBand::LongTerm) => 3.0,
        None => UNKNOWN,
    };
    let from_words = match urgency_hits(turns) {
        0 => UNKNOWN,
        1 => 7.0,
        _ => 9.0,
    };
    f32::max(from_timeline, from_words)
}

/// Counts urgency words across all user turns.
pub fn urgency_hits(turns: &[ConversationTurn]) -> usize {
    turns
        .iter()
        .map(|turn| {
            let words: Vec<String> = tokens(&turn.user_text);
            let lower = turn.user_text.to_lowercase();
            URGENCY_WORDS
                .iter()
                .filter(|w| {
                    if w.contains(' ') {
                        lower.contains(*w)
                    } else {
                        words.iter().any(|t| t == *w)
                    }
                })
                .count()
        })
        .sum()
}

pub fn authority(profile: &BusinessProfile) -> f32 {
    if profile.decision_maker { 10.0 } else { 3.0 }
}

/// Distinct pain points plus needs.
pub fn need(profile: &BusinessProfile) -> f32 {
    match profile.pain_points.len() + profile.needs.len() {
        0 => UNKNOWN,
        1 => 6.0,
        2 => 8.0,
        _ => 10.0,
    }
}

pub fn timeline(profile: &BusinessProfile) -> f32 {
    match profile.timeline.as_ref().map(|t| t.band) {
        Some(TimelineBand::Immediate) => 10.0,
        Some(TimelineBand::ShortTerm) => 9.0,
        Some(TimelineBand::MediumTerm) => 7.0,
        Some(TimelineBand::LongTerm) => 4.0,
        None => UNKNOWN,
    }
}

/// Derived from message count, insight variety, message length and questions.
pub fn engagement(turns: &[ConversationTurn], insights: &[Insight]) -> f32 {
    if turns.is_empty() {
        return 0.0;
    }
    let messages = turns.len().min(10) as f32;
    let types = distinct_types(insights).min(5) as f32;
    let total_words: usize = turns
        .iter()
        .map(|t| t.user_text.split_whitespace().count())
        .sum();
    let avg_words = total_words as f32 / turns.len() as f32;
    let questions = turns.iter().filter(|t| t.user_text.contains('?')).count();
    let question_ratio = questions as f32 / turns.len() as f32;

    let raw = messages * 0.4 + types * 0.6 + (avg_words / 10.0).min(1.5) + question_ratio * 1.5;
    raw.min(10.0)
}

pub fn distinct_types(insights: &[Insight]) -> usize {
    insights
        .iter()
        .map(|i| i.kind)
        .collect::<HashSet<InsightType>>()
        .len()
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
