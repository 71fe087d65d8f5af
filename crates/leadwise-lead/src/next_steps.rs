// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic next-step suggestions.

use leadwise_core::{BusinessProfile, LeadLevel};

const HOT_STEPS: &[&str] = &[
    "Schedule a demo call within 24 hours",
    "Send a tailored proposal",
];

const WARM_STEPS: &[&str] = &[
    "Share a relevant case study",
    "Offer a free consultation",
];

const COLD_STEPS: &[&str] = &[
    "Send introductory resources",
    "Add to the nurture email sequence",
];

/// Pain point keywords and the step each one adds.
const PAIN_STEPS: &[(&[&str], &str)] = &[
    (&["lead", "follow-up", "follow up"], "Walk through the lead capture and qualification workflow"),
    (&["manual", "time"], "Demonstrate the automation time savings"),
    (&["cost", "expensive", "price"], "Prepare an ROI breakdown"),
    (&["integrat", "crm"], "Review integration options with their current tools"),
];

/// Level steps first, then one step per matching pain point family.
///
/// Pain points are visited in set order so the output is stable.
pub fn next_steps(level: LeadLevel, profile: &BusinessProfile) -> Vec<String> {
    let base = match level {
        LeadLevel::Hot => HOT_STEPS,
        LeadLevel::Warm => WARM_STEPS,
        LeadLevel::Cold => COLD_STEPS,
    };
    let mut steps: Vec<String> = base.iter().map(|s| (*s).to_string()).collect();

    for pain in &profile.pain_points {
        let pain = pain.to_lowercase();
        for (keywords, step) in PAIN_STEPS {
            if keywords.iter().any(|k| pain.contains(k)) && !steps.iter().any(|s| s == step) {
                steps.push((*step).to_string());
            }
        }
    }

    if profile.budget.is_none() && level != LeadLevel::Cold {
        steps.push("Confirm the budget range".to_string());
    }
    steps
}
