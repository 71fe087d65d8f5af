// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytics for the Leadwise sales assistant.
//!
//! Reduces memory and qualification state into per-session snapshots and a
//! cross-session business report. Everything here is derived; nothing feeds
//! back into memory.

pub mod aggregator;
pub mod events;
pub mod objections;
pub mod report;
pub mod snapshot;

pub use aggregator::Analytics;
pub use events::{AnalyticsEvent, EventRecord, register_metrics};
pub use objections::{Objection, detect_objections};
pub use report::{BusinessReport, Ranked, SuccessFactor};
pub use snapshot::AnalyticsSnapshot;
