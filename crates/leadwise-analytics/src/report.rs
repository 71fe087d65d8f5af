// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-session business-intelligence report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use leadwise_core::{BusinessProfile, LeadLevel};
use serde::{Deserialize, Serialize};

use crate::objections::Objection;
use crate::snapshot::AnalyticsSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessReport {
    pub generated_at: DateTime<Utc>,
    pub total_sessions: usize,
    pub hot_leads: usize,
    pub warm_leads: usize,
    pub cold_leads: usize,
    pub average_score: f32,
    pub average_conversion: f32,
    pub top_industries: Vec<Ranked<String>>,
    pub common_objections: Vec<Ranked<Objection>>,
    pub success_factors: Vec<SuccessFactor>,
}

/// A value and the number of sessions it appeared in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked<T> {
    pub value: T,
    pub sessions: usize,
}

/// Share of hot sessions that exhibit a factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessFactor {
    pub factor: String,
    pub share: f32,
}

/// Entries kept in each ranked list.
const TOP_N: usize = 5;

/// One session's inputs to the report.
pub struct SessionRow<'a> {
    pub profile: &'a BusinessProfile,
    pub snapshot: &'a AnalyticsSnapshot,
}

/// Folds per-session rows into the report. Only existing facts are counted.
pub fn build(rows: &[SessionRow<'_>], now: DateTime<Utc>) -> BusinessReport {
    let level_count =
        |level: LeadLevel| rows.iter().filter(|r| r.snapshot.lead_level == Some(level)).count();

    let scored: Vec<f32> = rows.iter().filter_map(|r| r.snapshot.lead_score).collect();
    let average_score = mean(&scored);
    let conversions: Vec<f32> = rows.iter().map(|r| r.snapshot.conversion_probability).collect();

    let mut industries: BTreeMap<String, usize> = BTreeMap::new();
    let mut objections: BTreeMap<Objection, usize> = BTreeMap::new();
    for row in rows {
        if let Some(industry) = &row.profile.industry {
            *industries.entry(industry.clone()).or_default() += 1;
        }
        for objection in &row.snapshot.objections {
            *objections.entry(*objection).or_default() += 1;
        }
    }

    BusinessReport {
        generated_at: now,
        total_sessions: rows.len(),
        hot_leads: level_count(LeadLevel::Hot),
        warm_leads: level_count(LeadLevel::Warm),
        cold_leads: level_count(LeadLevel::Cold),
        average_score,
        average_conversion: mean(&conversions),
        top_industries: rank(industries),
        common_objections: rank(objections),
        success_factors: success_factors(rows),
    }
}

fn success_factors(rows: &[SessionRow<'_>]) -> Vec<SuccessFactor> {
    let hot: Vec<&BusinessProfile> = rows
        .iter()
        .filter(|r| r.snapshot.lead_level == Some(LeadLevel::Hot))
        .map(|r| r.profile)
        .collect();
    if hot.is_empty() {
        return Vec::new();
    }

    let checks: [(&str, fn(&BusinessProfile) -> bool); 4] = [
        ("budget known", |p| p.budget.is_some()),
        ("decision maker engaged", |p| p.decision_maker),
        ("near-term timeline", |p| p.timeline.as_ref().is_some_and(|t| t.is_near())),
        ("three or more pain points", |p| p.pain_points.len() >= 3),
    ];

    let mut factors: Vec<SuccessFactor> = checks
        .iter()
        .map(|(name, check)| SuccessFactor {
            factor: (*name).to_string(),
            share: hot.iter().filter(|p| check(p)).count() as f32 / hot.len() as f32,
        })
        .filter(|f| f.share > 0.0)
        .collect();
    factors.sort_by(|a, b| b.share.total_cmp(&a.share));
    factors
}

/// Most frequent first; ties keep key order.
fn rank<T: Ord>(counts: BTreeMap<T, usize>) -> Vec<Ranked<T>> {
    let mut ranked: Vec<Ranked<T>> = counts
        .into_iter()
        .map(|(value, sessions)| Ranked { value, sessions })
        .collect();
    ranked.sort_by(|a, b| b.sessions.cmp(&a.sessions));
    ranked.truncate(TOP_N);
    ranked
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadwise_core::SessionId;
    use std::collections::BTreeSet;

    fn snapshot(level: Option<LeadLevel>, score: Option<f32>, objections: &[Objection]) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            session_id: SessionId::from("s"),
            message_count: 1,
            engagement: 1.0,
            business_value: 0.0,
            conversion_probability: 0.5,
            lead_score: score,
            lead_level: level,
            avg_latency_ms: None,
            fallback_count: 0,
            cancelled_count: 0,
            objections: objections.iter().copied().collect::<BTreeSet<_>>(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn empty_report() {
        let report = build(&[], Utc::now());
        assert_eq!(report.total_sessions, 0);
        assert_eq!(report.average_score, 0.0);
        assert!(report.top_industries.is_empty());
        assert!(report.success_factors.is_empty());
    }

    #[test]
    fn counts_levels_industries_and_objections() {
        let saas = BusinessProfile {
            industry: Some("saas".into()),
            decision_maker: true,
            ..BusinessProfile::default()
        };
        let retail = BusinessProfile {
            industry: Some("ecommerce".into()),
            ..BusinessProfile::default()
        };
        let hot = snapshot(Some(LeadLevel::Hot), Some(9.0), &[Objection::Price]);
        let cold = snapshot(Some(LeadLevel::Cold), Some(3.0), &[Objection::Price, Objection::Trust]);
        let other_saas = snapshot(Some(LeadLevel::Warm), Some(6.0), &[]);
        let rows = [
            SessionRow { profile: &saas, snapshot: &hot },
            SessionRow { profile: &retail, snapshot: &cold },
            SessionRow { profile: &saas, snapshot: &other_saas },
        ];
        let report = build(&rows, Utc::now());
        assert_eq!(report.total_sessions, 3);
        assert_eq!((report.hot_leads, report.warm_leads, report.cold_leads), (1, 1, 1));
        assert!((report.average_score - 6.0).abs() < 1e-5);
        assert_eq!(report.top_industries[0].value, "saas");
        assert_eq!(report.top_industries[0].sessions, 2);
        assert_eq!(report.common_objections[0].value, Objection::Price);
        assert_eq!(report.common_objections[0].sessions, 2);
        assert_eq!(report.success_factors.len(), 1);
        assert_eq!(report.success_factors[0].factor, "decision maker engaged");
        assert_eq!(report.success_factors[0].share, 1.0);
    }
}
