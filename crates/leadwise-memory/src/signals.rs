// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message signals: intent, sentiment, and company information.

use std::sync::LazyLock;

use leadwise_core::{Intent, Sentiment};
use regex::Regex;

/// Intent keyword families, checked in order. The first family with a hit wins.
const INTENT_FAMILIES: &[(Intent, &[&str])] = &[
    (
        Intent::Pricing,
        &["price", "pricing", "cost", "how much", "budget", "quote", "plan", "fee"],
    ),
    (
        Intent::Scheduling,
        &["demo", "schedule", "book", "meeting", "call", "appointment", "calendar"],
    ),
    (
        Intent::Leads,
        &["lead", "prospect", "pipeline", "conversion", "sales", "qualify"],
    ),
    (
        Intent::Support,
        &["help", "support", "problem", "issue", "broken", "error", "bug"],
    ),
    (
        Intent::Integration,
        &["integrat", "crm", "hubspot", "salesforce", "zapier", "api", "connect"],
    ),
    (
        Intent::Automation,
        &["automat", "workflow", "manual", "repetitive", "email sequence"],
    ),
    (
        Intent::Greeting,
        &["hello", "hi ", "hey", "good morning", "good afternoon"],
    ),
];

const POSITIVE_WORDS: &[&str] = &[
    "great", "good", "love", "excellent", "awesome", "perfect", "thanks", "thank you",
    "interested", "excited", "amazing", "helpful", "nice", "sounds good",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "hate", "terrible", "awful", "frustrated", "annoying", "expensive", "problem",
    "struggling", "disappointed", "confusing", "slow", "worried", "not sure",
];

/// Classifies a message into a coarse intent.
pub fn detect_intent(text: &str) -> Intent {
    // Pad so short greetings like "hi" still match "hi ".
    let lower = format!("{} ", text.to_lowercase());
    INTENT_FAMILIES
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}

/// Lexicon sentiment: more positive hits than negative is positive, and so on.
pub fn detect_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Industry names and the keywords that reveal them.
pub const INDUSTRIES: &[(&str, &[&str])] = &[
    ("real estate", &["real estate", "realtor", "realty", "property management", "brokerage"]),
    ("healthcare", &["clinic", "hospital", "healthcare", "dental", "medical", "patients"]),
    ("ecommerce", &["ecommerce", "e-commerce", "online store", "shopify", "retail"]),
    ("saas", &["saas", "software company", "b2b software", "startup"]),
    ("finance", &["fintech", "bank", "insurance", "accounting", "financial"]),
    ("education", &["school", "university", "edtech", "online course", "students"]),
    ("hospitality", &["restaurant", "hotel", "cafe", "catering"]),
    ("legal", &["law firm", "legal", "attorney", "lawyer"]),
    ("marketing", &["marketing agency", "digital agency", "agency"]),
    ("manufacturing", &["manufacturing", "factory", "industrial"]),
];

static COMPANY_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:team of (\d{1,6})|(\d{1,6})\+?\s*(?:employees|people|staff|team members|person team|-person team))\b",
    )
    .expect("company size pattern compiles")
});

/// Company facts mentioned in one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyInfo {
    pub industry: Option<String>,
    pub company_size: Option<u32>,
}

/// Detects industry and headcount mentions.
pub fn detect_company(text: &str) -> CompanyInfo {
    let lower = text.to_lowercase();
    let industry = INDUSTRIES
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(name, _)| (*name).to_string());
    let company_size = COMPANY_SIZE.captures(text).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    });
    CompanyInfo {
        industry,
        company_size,
    }
}
