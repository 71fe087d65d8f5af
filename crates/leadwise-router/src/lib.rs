// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model router for Leadwise.
//!
//! Picks the inference tier for each turn in fixed business priority:
//! remote models for quality, the local runtime when remote is truly
//! unreachable, and the rules engine for guaranteed availability.

pub mod probe;
pub mod router;

pub use probe::{HealthReport, HttpRemoteProbe, LocalCapability, OllamaCapability, RemoteProbe};
pub use router::{ModelChoice, ModelRouter};
