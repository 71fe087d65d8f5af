// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Public chat state published to the UI.

use leadwise_core::{ChatMessage, Role, Tier};
use serde::Serialize;
use strum::Display;

/// Orchestrator lifecycle for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Sending,
    Streaming,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageStatus {
    Streaming,
    Complete,
    Cancelled,
}

/// One entry in the visible conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayMessage {
    /// Placeholder ids start with [`STREAMING_ID_PREFIX`] until finalized.
    pub id: String,
    pub role: Role,
    pub content: String,
    pub status: MessageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

/// Prefix marking an assistant message that is still being written.
pub const STREAMING_ID_PREFIX: &str = "streaming-";

impl DisplayMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            status: MessageStatus::Complete,
            provider: None,
            tier: None,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            id: format!("{STREAMING_ID_PREFIX}{}", uuid::Uuid::new_v4()),
            role: Role::Assistant,
            content: String::new(),
            status: MessageStatus::Streaming,
            provider: None,
            tier: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(STREAMING_ID_PREFIX)
    }
}

/// Everything a UI needs to render the chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatState {
    pub messages: Vec<DisplayMessage>,
    pub is_loading: bool,
    /// Friendly notice, never a raw provider error.
    pub error: Option<String>,
    pub active_provider: Option<String>,
    pub phase: Phase,
}

impl ChatState {
    /// Completed user and assistant messages as model input.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|m| m.status == MessageStatus::Complete && !m.content.is_empty())
            .map(|m| ChatMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    pub fn last_assistant(&self) -> Option<&DisplayMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_ids_are_marked() {
        let placeholder = DisplayMessage::placeholder();
        assert!(placeholder.is_placeholder());
        assert!(!DisplayMessage::user("hi").is_placeholder());
    }

    #[test]
    fn history_skips_unfinished_messages() {
        let mut cancelled = DisplayMessage::placeholder();
        cancelled.content = "partial".into();
        cancelled.status = MessageStatus::Cancelled;
        let state = ChatState {
            messages: vec![DisplayMessage::user("hi"), cancelled, DisplayMessage::placeholder()],
            ..ChatState::default()
        };
        assert_eq!(state.history(), vec![ChatMessage::user("hi")]);
    }
}
