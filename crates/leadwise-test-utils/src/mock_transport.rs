// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock gateway transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use leadwise_agent::{ChatTransport, RemoteReply};
use leadwise_core::{ChatMessage, LeadwiseError, SessionId};
use tokio::sync::Mutex;

use crate::mock_generator::scripted_stream;

/// One scripted gateway outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportScript {
    /// 200 with a streamed body from `provider`.
    Stream { provider: String, chunks: Vec<String> },
    /// The gateway's no-provider sentinel.
    Fallback,
    /// Connection or status failure.
    Fail(String),
}

impl TransportScript {
    pub fn reply(provider: &str, text: &str) -> Self {
        Self::Stream {
            provider: provider.to_string(),
            chunks: vec![text.to_string()],
        }
    }

    pub fn chunks(provider: &str, chunks: &[&str]) -> Self {
        Self::Stream {
            provider: provider.to_string(),
            chunks: chunks.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// Replays scripted gateway responses and records what was sent.
///
/// An exhausted script fails every further call.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<TransportScript>>,
    chunk_delay: Option<Duration>,
    calls: AtomicUsize,
    sent: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockTransport {
    pub fn new(script: Vec<TransportScript>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(script)),
            ..Self::default()
        }
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    pub async fn push(&self, script: TransportScript) {
        self.script.lock().await.push_back(script);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message lists received, one per call.
    pub async fn sent(&self) -> Vec<Vec<ChatMessage>> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(
        &self,
        _session: &SessionId,
        messages: &[ChatMessage],
    ) -> Result<RemoteReply, LeadwiseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().await.push(messages.to_vec());
        match self.script.lock().await.pop_front() {
            Some(TransportScript::Stream { provider, chunks }) => Ok(RemoteReply::Stream {
                provider,
                stream: scripted_stream(chunks, None, self.chunk_delay),
            }),
            Some(TransportScript::Fallback) => Ok(RemoteReply::Fallback),
            Some(TransportScript::Fail(message)) => Err(LeadwiseError::transient(message)),
            None => Err(LeadwiseError::transient("mock transport has no script left")),
        }
    }
}
