// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern-based insight extraction.
//!
//! Each detector scans user text independently and reports every match with
//! a fixed confidence. A single message can trip several detectors; the
//! matches are kept as separate insights.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use leadwise_core::{Budget, BudgetBand, Insight, InsightType, Timeline, TimelineBand};
use regex::Regex;

/// Confidence attached to each detector's matches.
pub fn confidence(kind: InsightType) -> f32 {
    match kind {
        InsightType::BusinessNeed => 0.8,
        InsightType::PainPoint => 0.75,
        InsightType::Budget => 0.9,
        InsightType::Timeline => 0.85,
        InsightType::DecisionMaker => 0.8,
    }
}

/// Longest value kept from a captured clause.
const MAX_VALUE_CHARS: usize = 80;

static NEED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:we need|i need|we're looking for|we are looking for|looking for|we want to|i want to|interested in|need help with|we'd like to|hoping to)\s+([^.!?\n]{3,})",
    )
    .expect("need pattern compiles")
});

static PAIN_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:struggl(?:e|ing) with|problems? with|issues? with|frustrated (?:with|by)|tired of|our biggest (?:problem|challenge) is|pain point is|hard to)\s+([^.!?\n]{3,})",
    )
    .expect("pain clause pattern compiles")
});

/// Phrases that are pain points on their own.
const PAIN_KEYWORDS: &[&str] = &[
    "manual data entry",
    "manual process",
    "too much time",
    "wasting time",
    "time-consuming",
    "time consuming",
    "losing leads",
    "losing customers",
    "missed follow-ups",
    "missed leads",
    "slow response",
    "too expensive",
    "high costs",
    "costs too much",
    "no visibility",
    "overwhelmed",
];

static MONEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s?(\d[\d,]*(?:\.\d+)?)\s?(k|m|thousand|million)?\b")
        .expect("money pattern compiles")
});

static MONEY_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d[\d,]*(?:\.\d+)?)\s?(k|m|thousand|million)?\s?(?:dollars|usd|bucks)\b")
        .expect("money words pattern compiles")
});

static BUDGET_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbudget\b[^.!?\d]{0,20}(\d[\d,]*(?:\.\d+)?)\s?(k|m|thousand|million)?\b")
        .expect("budget amount pattern compiles")
});

/// Qualitative budget phrases and the band they imply.
const BUDGET_PHRASES: &[(&str, BudgetBand)] = &[
    ("tight budget", BudgetBand::Low),
    ("limited budget", BudgetBand::Low),
    ("small budget", BudgetBand::Low),
    ("low budget", BudgetBand::Low),
    ("no budget", BudgetBand::Low),
    ("flexible budget", BudgetBand::Medium),
    ("healthy budget", BudgetBand::Medium),
    ("decent budget", BudgetBand::Medium),
    ("budget is flexible", BudgetBand::Medium),
    ("large budget", BudgetBand::High),
    ("big budget", BudgetBand::High),
    ("money is not an issue", BudgetBand::High),
];

/// Timeline patterns, checked nearest band first.
static TIMELINES: LazyLock<Vec<(Regex, TimelineBand)>> = LazyLock::new(|| {
    [
        (
            r"(?i)\b(?:asap|as soon as possible|urgent(?:ly)?|right away|immediately|this week|today|tomorrow)\b",
            TimelineBand::Immediate,
        ),
        (
            r"(?i)\b(?:within (?:a|one|1) month|next month|this month|(?:a )?few weeks|(?:in|within) (?:\d|two|three|four) weeks|(?:in|within) 30 days)\b",
            TimelineBand::ShortTerm,
        ),
        (
            r"(?i)\b(?:this quarter|next quarter|(?:in|within) (?:[2-6]|two|three|four|five|six) months|couple of months|few months)\b",
            TimelineBand::MediumTerm,
        ),
        (
            r"(?i)(?:\bnext year\b|\b6\+ months|\b(?:in|within) (?:[7-9]|1[0-2]|seven|eight|nine|ten|eleven|twelve) months\b|\bsomeday\b|\beventually\b|\bno rush\b|\blong[- ]term\b)",
            TimelineBand::LongTerm,
        ),
    ]
    .into_iter()
    .map(|(pattern, band)| (Regex::new(pattern).expect("timeline pattern compiles"), band))
    .collect()
});

static DECISION_MAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:i(?:'m| am) (?:the |a )?(?:owner|co-?founder|founder|ceo|cto|coo|cmo|president|decision[- ]maker|head of \w+|director|vp|managing partner)|i (?:own|run|founded) (?:the|a|my|our) \w+|i make (?:the|all the) (?:final )?decisions?|it'?s my (?:call|decision)|i sign off|i have (?:the )?final say)",
    )
    .expect("decision maker pattern compiles")
});

/// Runs every detector against `text` and returns the matches as insights.
pub fn extract_insights(text: &str, source_turn: usize, now: DateTime<Utc>) -> Vec<Insight> {
    let mut insights = Vec::new();
    let mut push = |kind: InsightType, value: String| {
        insights.push(Insight {
            kind,
            value,
            confidence: confidence(kind),
            source_turn,
            timestamp: now,
        });
    };

    for caps in NEED.captures_iter(text) {
        push(InsightType::BusinessNeed, clip(&caps[1]));
    }

    for value in detect_pain_points(text) {
        push(InsightType::PainPoint, value);
    }

    if let Some(budget) = parse_budget(text) {
        push(InsightType::Budget, budget.raw);
    }

    if let Some(timeline) = parse_timeline(text) {
        push(InsightType::Timeline, timeline.raw);
    }

    if let Some(m) = DECISION_MAKER.find(text) {
        push(InsightType::DecisionMaker, m.as_str().to_string());
    }

    insights
}

/// Pain points named in `text`: captured clauses first, then keywords.
pub fn detect_pain_points(text: &str) -> Vec<String> {
    let mut found: Vec<String> = PAIN_CLAUSE
        .captures_iter(text)
        .map(|caps| clip(&caps[1]).to_lowercase())
        .collect();
    let lower = text.to_lowercase();
    for keyword in PAIN_KEYWORDS {
        if lower.contains(keyword) && !found.iter().any(|f| f.contains(keyword)) {
            found.push((*keyword).to_string());
        }
    }
    found
}

/// Parses the first stated budget in `text`.
///
/// Amounts of $10,000 or more are high, $2,000 or more medium, the rest low.
pub fn parse_budget(text: &str) -> Option<Budget> {
    for pattern in [&*BUDGET_AMOUNT, &*MONEY, &*MONEY_WORDS] {
        if let Some(caps) = pattern.captures(text) {
            let Some(amount) = parse_amount(&caps[1], caps.get(2).map(|m| m.as_str())) else {
                continue;
            };
            return Some(Budget {
                raw: caps[0].trim().to_string(),
                band: band_for_amount(amount),
            });
        }
    }

    let lower = text.to_lowercase();
    BUDGET_PHRASES
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(phrase, band)| Budget {
            raw: (*phrase).to_string(),
            band: *band,
        })
}

fn parse_amount(number: &str, suffix: Option<&str>) -> Option<f64> {
    let base: f64 = number.replace(',', "").parse().ok()?;
    let multiplier = match suffix.map(str::to_lowercase).as_deref() {
        Some("k") | Some("thousand") => 1_000.0,
        Some("m") | Some("million") => 1_000_000.0,
        _ => 1.0,
    };
    Some(base * multiplier)
}

/// Maps a dollar amount onto a budget band.
pub fn band_for_amount(amount: f64) -> BudgetBand {
    if amount >= 10_000.0 {
        BudgetBand::High
    } else if amount >= 2_000.0 {
        BudgetBand::Medium
    } else {
        BudgetBand::Low
    }
}

/// Parses the nearest stated timeline in `text`.
pub fn parse_timeline(text: &str) -> Option<Timeline> {
    TIMELINES.iter().find_map(|(pattern, band)| {
        pattern.find(text).map(|m| Timeline {
            raw: m.as_str().to_string(),
            band: *band,
        })
    })
}

fn clip(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches([',', ';', ':']);
    match trimmed.char_indices().nth(MAX_VALUE_CHARS) {
        Some((idx, _)) => trimmed[..idx].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<InsightType> {
        extract_insights(text, 0, Utc::now())
            .into_iter()
            .map(|i| i.kind)
            .collect()
    }

    #[test]
    fn budget_50k_is_high() {
        let budget = parse_budget("our budget is $50k").unwrap();
        assert_eq!(budget.band, BudgetBand::High);
        assert!(budget.raw.contains("50"));
    }

    #[test]
    fn budget_bands_by_amount() {
        assert_eq!(parse_budget("about $5,000").unwrap().band, BudgetBand::Medium);
        assert_eq!(parse_budget("maybe $500 a month").unwrap().band, BudgetBand::Low);
        assert_eq!(parse_budget("budget around 2k").unwrap().band, BudgetBand::Medium);
        assert_eq!(parse_budget("we have 1.5 million dollars").unwrap().band, BudgetBand::High);
    }

    #[test]
    fn qualitative_budget() {
        assert_eq!(parse_budget("we're on a tight budget").unwrap().band, BudgetBand::Low);
        assert_eq!(parse_budget("our budget is flexible").unwrap().band, BudgetBand::Medium);
        assert!(parse_budget("hello there").is_none());
    }

    #[test]
    fn timeline_bands() {
        assert_eq!(parse_timeline("we need this ASAP").unwrap().band, TimelineBand::Immediate);
        assert_eq!(
            parse_timeline("we need this within a month").unwrap().band,
            TimelineBand::ShortTerm
        );
        assert_eq!(
            parse_timeline("sometime this quarter").unwrap().band,
            TimelineBand::MediumTerm
        );
        assert_eq!(parse_timeline("maybe next year").unwrap().band, TimelineBand::LongTerm);
        assert!(parse_timeline("tell me about pricing").is_none());
    }

    #[test]
    fn multi_type_matches_are_independent() {
        let found = kinds("I'm the owner and we need a chatbot ASAP, budget is $20k");
        assert!(found.contains(&InsightType::DecisionMaker));
        assert!(found.contains(&InsightType::BusinessNeed));
        assert!(found.contains(&InsightType::Timeline));
        assert!(found.contains(&InsightType::Budget));
    }

    #[test]
    fn pain_point_clause_and_keyword() {
        let pains = detect_pain_points("We're struggling with lead follow-up. Lots of manual data entry.");
        assert!(pains.iter().any(|p| p.starts_with("lead follow-up")));
        assert!(pains.iter().any(|p| p == "manual data entry"));
    }

    #[test]
    fn confidences_are_fixed() {
        let insights = extract_insights("we need better reporting", 3, Utc::now());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].confidence, 0.8);
        assert_eq!(insights[0].source_turn, 3);
        assert_eq!(insights[0].value, "better reporting");
    }

    #[test]
    fn long_clause_is_clipped() {
        let text = format!("we need {}", "x".repeat(200));
        let insights = extract_insights(&text, 0, Utc::now());
        assert_eq!(insights[0].value.chars().count(), MAX_VALUE_CHARS);
    }

    #[test]
    fn plain_greeting_yields_nothing() {
        assert!(kinds("hi there!").is_empty());
    }
}
