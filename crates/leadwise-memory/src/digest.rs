// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded textual digest of a session's memory.

use std::fmt::Write;

use leadwise_core::Insight;

use crate::store::SessionMemory;

/// Upper bound on digest length, in characters.
pub const MAX_DIGEST_CHARS: usize = 2_000;

const RECENT_INSIGHTS: usize = 5;
const RECENT_TURNS: usize = 3;

/// Per-message cap inside the recent conversation, so three turns always
/// fit under [`MAX_DIGEST_CHARS`].
const TURN_TEXT_CHARS: usize = 280;

/// Renders company info, profile, recent insights and recent turns.
///
/// Missing fields are omitted. Insights whose value shares a word with
/// `query` are listed first. When the digest runs long, the summary is cut
/// and the recent conversation is kept.
pub fn render(memory: &SessionMemory, query: &str) -> String {
    let recent = recent_conversation(memory);
    let budget = MAX_DIGEST_CHARS.saturating_sub(recent.chars().count());
    let mut out = summary(memory, query);
    if out.chars().count() > budget {
        out = truncate_chars(out, budget.saturating_sub(1));
        out.push('\n');
    }
    out.push_str(&recent);
    out
}

fn summary(memory: &SessionMemory, query: &str) -> String {
    let mut out = String::new();
    let profile = &memory.profile;

    let mut company = Vec::new();
    if let Some(industry) = &profile.industry {
        company.push(format!("industry {industry}"));
    }
    if let Some(size) = profile.company_size {
        company.push(format!("{size} employees"));
    }
    if !company.is_empty() {
        let _ = writeln!(out, "Company: {}", company.join(", "));
    }

    if !profile.pain_points.is_empty() {
        let _ = writeln!(out, "Pain points: {}", join(&profile.pain_points));
    }
    if !profile.needs.is_empty() {
        let _ = writeln!(out, "Needs: {}", join(&profile.needs));
    }
    if let Some(budget) = &profile.budget {
        let _ = writeln!(out, "Budget: {} ({})", budget.raw, budget.band);
    }
    if let Some(timeline) = &profile.timeline {
        let _ = writeln!(out, "Timeline: {} ({})", timeline.raw, timeline.band);
    }
    if profile.decision_maker {
        let _ = writeln!(out, "Decision maker: yes");
    }

    let insights = ranked_insights(&memory.insights, query);
    if !insights.is_empty() {
        let _ = writeln!(out, "Recent insights:");
        for insight in insights {
            let _ = writeln!(out, "- {}: {}", insight.kind, insight.value);
        }
    }

    out
}

fn recent_conversation(memory: &SessionMemory) -> String {
    let mut out = String::new();
    let start = memory.turns.len().saturating_sub(RECENT_TURNS);
    if start < memory.turns.len() {
        let _ = writeln!(out, "Recent conversation:");
        for turn in &memory.turns[start..] {
            let _ = writeln!(out, "User: {}", clip(&turn.user_text));
            if !turn.ai_text.is_empty() {
                let _ = writeln!(out, "Assistant: {}", clip(&turn.ai_text));
            }
        }
    }
    out
}

fn clip(text: &str) -> String {
    truncate_chars(text.trim().to_string(), TURN_TEXT_CHARS)
}

fn join(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Last few insights, query matches first, newest first within each group.
fn ranked_insights<'a>(insights: &'a [Insight], query: &str) -> Vec<&'a Insight> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .collect();
    let matches = |insight: &Insight| {
        let value = insight.value.to_lowercase();
        terms.iter().any(|t| value.contains(t.as_str()))
    };

    let start = insights.len().saturating_sub(RECENT_INSIGHTS);
    let recent = &insights[start..];
    let mut ranked: Vec<&Insight> = recent.iter().rev().filter(|i| matches(*i)).collect();
    ranked.extend(recent.iter().rev().filter(|i| !matches(*i)));
    ranked
}

fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}
