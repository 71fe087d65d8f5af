// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead qualification for the Leadwise sales assistant.
//!
//! Six factors (budget, urgency, authority, need, timeline, engagement) are
//! banded from the session's business profile and history, averaged into a
//! 0-10 score, and thresholded into hot, warm or cold.

pub mod engine;
pub mod factors;
pub mod next_steps;

pub use engine::{LeadQualifier, qualify};
pub use next_steps::next_steps;
