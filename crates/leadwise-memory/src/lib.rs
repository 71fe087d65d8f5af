// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory for the Leadwise sales assistant.
//!
//! Every finished turn is scanned by a fixed battery of pattern detectors.
//! Matches become [`Insight`](leadwise_core::Insight)s and are folded into the
//! session's [`BusinessProfile`](leadwise_core::BusinessProfile): pain points
//! and needs accumulate, scalar fields take the latest value.

pub mod digest;
pub mod extractor;
pub mod signals;
pub mod store;

pub use extractor::extract_insights;
pub use signals::{CompanyInfo, detect_company, detect_intent, detect_sentiment};
pub use store::{ConversationMemory, SessionMemory, new_turn};
