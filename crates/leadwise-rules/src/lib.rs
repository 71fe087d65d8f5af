// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rules fallback engine for Leadwise.
//!
//! The guaranteed-availability tier: keyword families map to canned but
//! varied replies, and a rolling per-session history suppresses anything
//! that overlaps what was already said. When every variant is used up the
//! visitor is pointed at a human contact channel.

pub mod engine;
pub mod families;
pub mod overlap;

pub use engine::{DEFAULT_HISTORY_SIZE, ReplyHistory, RuleContext, RuleReply, RulesEngine};
pub use families::{GREETING, RuleFamily, classify, contact_reply};
pub use overlap::overlaps;
