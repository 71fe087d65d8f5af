// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits shared across the workspace.

pub mod generator;
pub mod store;

pub use generator::{TextGenerator, TextStream};
pub use store::SessionStore;
