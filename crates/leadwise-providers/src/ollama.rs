// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local inference through an Ollama-compatible `/api/chat` endpoint.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use leadwise_config::LocalConfig;
use leadwise_core::{ChatMessage, LeadwiseError, Role, TextGenerator, TextStream};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frames::{Frame, into_text_stream};
use crate::http::{build_client, send_error, status_error};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatLine {
    #[serde(default)]
    message: Option<LineMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LineMessage {
    #[serde(default)]
    content: String,
}

/// Streams newline-delimited JSON from a local runtime.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &LocalConfig, timeout: Duration) -> Result<Self, LeadwiseError> {
        Ok(Self {
            client: build_client(HeaderMap::new(), timeout)?,
            url: format!("{}/api/chat", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<TextStream, LeadwiseError> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = system_prompt {
            wire.push(WireMessage {
                role: Role::System,
                content: system,
            });
        }
        wire.extend(messages.iter().map(|m| WireMessage {
            role: m.role,
            content: &m.content,
        }));
        let request = ChatRequest {
            model: &self.model,
            messages: wire,
            stream: true,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("ollama", e))?;
        let status = response.status();
        debug!(provider = "ollama", status = %status, "stream opened");
        if !status.is_success() {
            return Err(status_error("ollama", response).await);
        }
        Ok(into_text_stream(ndjson_frames(response.bytes_stream().boxed())))
    }
}

struct LineReader {
    inner: BoxStream<'static, Result<Bytes, reqwest::Error>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<Frame, LeadwiseError>>,
    finished: bool,
}

impl LineReader {
    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(frame) = decode_line(&line) {
                self.pending.push_back(frame);
            }
        }
    }
}

/// Splits a byte stream on newlines; lines may span network chunks.
fn ndjson_frames(
    bytes: BoxStream<'static, Result<Bytes, reqwest::Error>>,
) -> impl futures::Stream<Item = Result<Frame, LeadwiseError>> + Send + 'static {
    let reader = LineReader {
        inner: bytes,
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };
    stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(frame) = reader.pending.pop_front() {
                return Some((frame, reader));
            }
            if reader.finished {
                return None;
            }
            match reader.inner.next().await {
                Some(Ok(chunk)) => {
                    reader.buffer.extend_from_slice(&chunk);
                    reader.drain_lines();
                }
                Some(Err(e)) => {
                    reader.finished = true;
                    reader.pending.push_back(Err(LeadwiseError::Provider {
                        message: format!("local stream interrupted: {e}"),
                        retryable: true,
                        source: Some(Box::new(e)),
                    }));
                }
                None => {
                    reader.finished = true;
                    let rest = std::mem::take(&mut reader.buffer);
                    if let Some(frame) = decode_line(&rest) {
                        reader.pending.push_back(frame);
                    }
                }
            }
        }
    })
}

fn decode_line(line: &[u8]) -> Option<Result<Frame, LeadwiseError>> {
    let text = std::str::from_utf8(line).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<ChatLine>(text) {
        Ok(ChatLine {
            error: Some(error), ..
        }) => Some(Err(LeadwiseError::permanent(format!("local runtime error: {error}")))),
        Ok(line) if line.done => Some(Ok(Frame::Done)),
        Ok(line) => line.message.map(|m| Ok(Frame::Text(m.content))),
        Err(e) => Some(Err(LeadwiseError::Provider {
            message: format!("malformed local stream line: {e}"),
            retryable: false,
            source: Some(Box::new(e)),
        })),
    }
}
