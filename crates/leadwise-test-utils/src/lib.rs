// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadwise integration tests.
//!
//! Scripted stand-ins for every network edge so the orchestrator and
//! gateway can be exercised without real providers.
//!
//! # Components
//!
//! - [`MockGenerator`] - text generator with queued replies and failures
//! - [`MockTransport`] - gateway transport with queued outcomes
//! - [`StaticProbe`] / [`StaticLocal`] - fixed router inputs
//! - [`TestHarness`] - an orchestrator wired to the mocks

pub mod harness;
pub mod mock_generator;
pub mod mock_transport;
pub mod probes;

pub use harness::{TEST_CONTACT_EMAIL, TestHarness, TestHarnessBuilder};
pub use mock_generator::{MockGenerator, Script};
pub use mock_transport::{MockTransport, TransportScript};
pub use probes::{StaticLocal, StaticProbe};
