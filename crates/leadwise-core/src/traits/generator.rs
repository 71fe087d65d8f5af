// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text generation capability shared by remote providers and the local runtime.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::LeadwiseError;
use crate::types::ChatMessage;

/// A stream of normalized text chunks, independent of any wire format.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LeadwiseError>> + Send>>;

/// Anything that can turn a conversation into a stream of text.
///
/// Each provider's wire format (OpenAI-style SSE, Anthropic SSE, NDJSON)
/// is decoded behind this interface so callers only ever see text chunks.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Stable identifier used in logs and response metadata.
    fn name(&self) -> &str;

    /// Starts generation and returns the chunk stream.
    ///
    /// Errors returned here happen before any text was produced and are
    /// safe to retry when [`LeadwiseError::is_retryable`] says so.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<TextStream, LeadwiseError>;
}
