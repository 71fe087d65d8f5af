// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sales objection detection over user text.

use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Objection {
    Price,
    Timing,
    Trust,
    Competitor,
    Complexity,
}

const OBJECTION_PHRASES: &[(Objection, &[&str])] = &[
    (
        Objection::Price,
        &["too expensive", "expensive", "can't afford", "cannot afford", "too pricey", "cheaper", "out of our budget"],
    ),
    (
        Objection::Timing,
        &["not the right time", "not right now", "maybe later", "too busy", "no time for", "circle back"],
    ),
    (
        Objection::Trust,
        &["skeptical", "does it really", "guarantee", "scam", "not convinced", "proof", "references"],
    ),
    (
        Objection::Competitor,
        &["already use", "competitor", "alternative", "other vendor", "intercom", "drift", "zendesk"],
    ),
    (
        Objection::Complexity,
        &["complicated", "too complex", "hard to set up", "learning curve", "too technical", "difficult"],
    ),
];

/// Every objection category raised in `text`, in declaration order.
pub fn detect_objections(text: &str) -> Vec<Objection> {
    let lower = text.to_lowercase();
    OBJECTION_PHRASES
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(objection, _)| *objection)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_categories() {
        assert_eq!(detect_objections("That's too expensive for us"), vec![Objection::Price]);
        assert_eq!(
            detect_objections("We already use Intercom and it was complicated"),
            vec![Objection::Competitor, Objection::Complexity]
        );
        assert!(detect_objections("Sounds good, let's talk").is_empty());
    }
}
