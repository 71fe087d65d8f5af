// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for lead scoring.

use chrono::Utc;
use leadwise_core::{
    Budget, BudgetBand, BusinessProfile, LeadLevel, SessionId, Timeline, TimelineBand,
};
use leadwise_lead::{LeadQualifier, qualify};
use leadwise_memory::{ConversationMemory, extract_insights, new_turn};
use proptest::prelude::*;

fn budget_band() -> impl Strategy<Value = Option<BudgetBand>> {
    prop_oneof![
        Just(None),
        Just(Some(BudgetBand::High)),
        Just(Some(BudgetBand::Medium)),
        Just(Some(BudgetBand::Low)),
    ]
}

fn timeline_band() -> impl Strategy<Value = Option<TimelineBand>> {
    prop_oneof![
        Just(None),
        Just(Some(TimelineBand::Immediate)),
        Just(Some(TimelineBand::ShortTerm)),
        Just(Some(TimelineBand::MediumTerm)),
        Just(Some(TimelineBand::LongTerm)),
    ]
}

fn profile() -> impl Strategy<Value = BusinessProfile> {
    (
        budget_band(),
        timeline_band(),
        any::<bool>(),
        prop::collection::btree_set("[a-z ]{3,12}", 0..5),
    )
        .prop_map(|(budget, timeline, decision_maker, pain_points)| BusinessProfile {
            budget: budget.map(|band| Budget {
                raw: "stated".to_string(),
                band,
            }),
            timeline: timeline.map(|band| Timeline {
                raw: "stated".to_string(),
                band,
            }),
            decision_maker,
            pain_points,
            ..BusinessProfile::default()
        })
}

proptest! {
    #[test]
    fn score_in_range_and_level_consistent(
        profile in profile(),
        messages in prop::collection::vec("[a-zA-Z ?$0-9]{0,60}", 0..15),
    ) {
        let now = Utc::now();
        let turns: Vec<_> = messages.iter().map(|m| new_turn(m, "ok", now)).collect();
        let insights: Vec<_> = messages
            .iter()
            .enumerate()
            .flat_map(|(i, m)| extract_insights(m, i, now))
            .collect();

        let lead = qualify(&profile, &turns, &insights);
        prop_assert!((0.0..=10.0).contains(&lead.score));
        let expected = if lead.score >= 8.0 {
            LeadLevel::Hot
        } else if lead.score >= 6.0 {
            LeadLevel::Warm
        } else {
            LeadLevel::Cold
        };
        prop_assert_eq!(lead.level, expected);
        for value in lead.factors.values() {
            prop_assert!((0.0..=10.0).contains(&value));
        }

        // Same inputs, same profile.
        prop_assert_eq!(qualify(&profile, &turns, &insights), lead);
    }
}

#[tokio::test]
async fn budget_and_timeline_never_lower_the_score() {
    let memory = ConversationMemory::default();
    let qualifier = LeadQualifier::in_memory(memory.clone());
    let id = SessionId::from("example");

    memory
        .record_exchange(&id, "Hi, what do you offer?", "We build chatbots.")
        .await
        .unwrap();
    let before = qualifier.update_lead(&id).await.unwrap();

    memory
        .record_exchange(&id, "our budget is $50k", "Thanks!")
        .await
        .unwrap();
    let after_budget = qualifier.update_lead(&id).await.unwrap();

    memory
        .record_exchange(&id, "we need this within a month", "Understood.")
        .await
        .unwrap();
    let after_timeline = qualifier.update_lead(&id).await.unwrap();

    let profile = memory.get_context(&id).await.unwrap().unwrap().profile;
    assert_eq!(profile.budget.unwrap().band, BudgetBand::High);
    assert!(profile.timeline.unwrap().is_near());
    assert!(after_budget.score >= before.score);
    assert!(after_timeline.score >= after_budget.score);
}
