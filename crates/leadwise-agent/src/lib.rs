// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side conversation orchestrator for the Leadwise assistant.
//!
//! The [`Orchestrator`] owns the visible chat state for one session. Each
//! turn is routed to the remote gateway, a local model, or the rules engine,
//! streamed into a placeholder message at a throttled cadence, and recorded
//! in memory, lead scoring and analytics once complete.

pub mod buffer;
pub mod orchestrator;
pub mod state;
pub mod transport;

pub use buffer::{DEFAULT_FLUSH_INTERVAL, StreamBuffer};
pub use orchestrator::{
    Dependencies, LOCAL_UNAVAILABLE_NOTICE, Orchestrator, REMOTE_UNAVAILABLE_NOTICE,
    RULES_PROVIDER, TurnOutcome,
};
pub use state::{ChatState, DisplayMessage, MessageStatus, Phase, STREAMING_ID_PREFIX};
pub use transport::{ChatTransport, HttpChatTransport, RemoteReply, utf8_stream};
