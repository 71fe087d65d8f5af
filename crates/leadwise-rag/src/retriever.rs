// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Term and tag overlap scoring.

use serde::Serialize;
use tracing::debug;

use crate::documents::{self, KnowledgeDocument};

const TITLE_WEIGHT: f32 = 2.0;
const TAG_WEIGHT: f32 = 3.0;
const CONTENT_WEIGHT: f32 = 1.0;
const INDUSTRY_BOOST: f32 = 1.25;

/// Default number of matches returned.
pub const DEFAULT_TOP_K: usize = 5;

/// Below this confidence callers should prefer the rules engine.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "do", "does", "for", "from",
    "have", "how", "i", "in", "is", "it", "me", "my", "of", "on", "or", "our", "so", "that",
    "the", "this", "to", "us", "we", "what", "when", "where", "which", "who", "why", "will",
    "with", "you", "your",
];

/// Lowercased query terms with stopwords removed.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
    {
        if !STOPWORDS.contains(&term.as_str()) && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

impl KnowledgeDocument {
    /// Raw overlap score against pre-split terms.
    pub fn relevance(&self, terms: &[String]) -> f32 {
        let title = self.title.to_lowercase();
        let content = self.content.to_lowercase();
        terms
            .iter()
            .map(|term| {
                let mut score = 0.0;
                if title.contains(term.as_str()) {
                    score += TITLE_WEIGHT;
                }
                if self.tags.iter().any(|tag| tag_matches(tag, term)) {
                    score += TAG_WEIGHT;
                }
                if content.contains(term.as_str()) {
                    score += CONTENT_WEIGHT;
                }
                score
            })
            .sum()
    }

    /// Raw overlap score for a free-text query.
    pub fn relevance_score(&self, query: &str) -> f32 {
        self.relevance(&query_terms(query))
    }
}

fn tag_matches(tag: &str, term: &str) -> bool {
    tag.eq_ignore_ascii_case(term) || tag.split(' ').any(|word| word.eq_ignore_ascii_case(term))
}

/// A document and how well it matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: KnowledgeDocument,
    pub score: f32,
    /// `score` normalised into `[0, 1]`.
    pub confidence: f32,
}

/// Matches for one query, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Retrieval {
    pub matches: Vec<ScoredDocument>,
    /// Confidence of the best match, 0 when nothing matched.
    pub confidence: f32,
}

impl Retrieval {
    /// True when the best match is too weak to answer from.
    pub fn prefer_rules(&self, min_confidence: f32) -> bool {
        self.confidence < min_confidence
    }
}

/// A fixed document set with keyword scoring.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    documents: Vec<KnowledgeDocument>,
    top_k: usize,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(documents::builtin())
    }
}

impl KnowledgeBase {
    pub fn new(documents: Vec<KnowledgeDocument>) -> Self {
        Self {
            documents,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    /// Scores every document against `query`, boosting `industry` matches.
    pub fn search(&self, query: &str, industry: Option<&str>) -> Retrieval {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Retrieval {
                matches: Vec::new(),
                confidence: 0.0,
            };
        }
        let ceiling = 3.0 * terms.len() as f32;

        let mut matches: Vec<ScoredDocument> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let mut score = doc.relevance(&terms);
                if score <= 0.0 {
                    return None;
                }
                if industry.is_some_and(|ind| doc.industries.iter().any(|d| d.eq_ignore_ascii_case(ind))) {
                    score *= INDUSTRY_BOOST;
                }
                Some(ScoredDocument {
                    document: doc.clone(),
                    score,
                    confidence: (score / ceiling).min(1.0),
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(self.top_k);
        let confidence = matches.first().map(|m| m.confidence).unwrap_or(0.0);
        debug!(
            terms = terms.len(),
            matches = matches.len(),
            confidence,
            "knowledge search"
        );
        Retrieval {
            matches,
            confidence,
        }
    }
}
