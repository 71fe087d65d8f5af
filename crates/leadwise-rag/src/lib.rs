// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge retrieval for Leadwise.
//!
//! Scores a fixed set of [`KnowledgeDocument`]s against a query by term and
//! tag overlap. A weak best match tells the caller to answer from rules
//! instead of grounding a model prompt.

pub mod documents;
pub mod retriever;

pub use documents::{KnowledgeDocument, builtin};
pub use retriever::{
    DEFAULT_MIN_CONFIDENCE, DEFAULT_TOP_K, KnowledgeBase, Retrieval, ScoredDocument, query_terms,
};
