// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text generator for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use leadwise_core::{ChatMessage, LeadwiseError, TextGenerator, TextStream};
use tokio::sync::Mutex;

/// One scripted generator outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Script {
    /// Stream these chunks, then end.
    Reply(Vec<String>),
    /// Fail before streaming.
    Fail { message: String, retryable: bool },
    /// Stream the chunks, then fail.
    Interrupted(Vec<String>),
}

impl Script {
    pub fn reply(text: &str) -> Self {
        Self::Reply(vec![text.to_string()])
    }

    pub fn chunks(chunks: &[&str]) -> Self {
        Self::Reply(chunks.iter().map(|c| (*c).to_string()).collect())
    }

    pub fn transient(message: &str) -> Self {
        Self::Fail {
            message: message.to_string(),
            retryable: true,
        }
    }

    pub fn permanent(message: &str) -> Self {
        Self::Fail {
            message: message.to_string(),
            retryable: false,
        }
    }
}

/// Builds a stream from scripted chunks, pausing `delay` before each one.
pub(crate) fn scripted_stream(
    chunks: Vec<String>,
    trailing_error: Option<String>,
    delay: Option<Duration>,
) -> TextStream {
    let mut items: VecDeque<Result<String, LeadwiseError>> =
        chunks.into_iter().map(Ok).collect();
    if let Some(message) = trailing_error {
        items.push_back(Err(LeadwiseError::transient(message)));
    }
    Box::pin(stream::unfold(items, move |mut items| async move {
        let item = items.pop_front()?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Some((item, items))
    }))
}

/// A text generator that replays a FIFO script.
///
/// When the script runs out, every call streams "mock response".
pub struct MockGenerator {
    name: String,
    script: Arc<Mutex<VecDeque<Script>>>,
    chunk_delay: Option<Duration>,
    calls: AtomicUsize,
    last_system: Mutex<Option<String>>,
}

impl MockGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            chunk_delay: None,
            calls: AtomicUsize::new(0),
            last_system: Mutex::new(None),
        }
    }

    pub fn with_script(name: &str, script: Vec<Script>) -> Self {
        let generator = Self::new(name);
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            ..generator
        }
    }

    /// Sleeps before each chunk, for cancellation tests.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    pub async fn push(&self, script: Script) {
        self.script.lock().await.push_back(script);
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// System prompt passed to the most recent call.
    pub async fn last_system(&self) -> Option<String> {
        self.last_system.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        _messages: &[ChatMessage],
        system: Option<&str>,
    ) -> Result<TextStream, LeadwiseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system.lock().await = system.map(str::to_string);
        let next = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Script::reply("mock response"));
        match next {
            Script::Reply(chunks) => Ok(scripted_stream(chunks, None, self.chunk_delay)),
            Script::Interrupted(chunks) => Ok(scripted_stream(
                chunks,
                Some(format!("{} stream interrupted", self.name)),
                self.chunk_delay,
            )),
            Script::Fail { message, retryable } => Err(if retryable {
                LeadwiseError::transient(message)
            } else {
                LeadwiseError::permanent(message)
            }),
        }
    }
}
