// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client side of the chat endpoint.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use leadwise_config::ClientConfig;
use leadwise_core::{
    ChatMessage, FALLBACK_PROVIDER, LeadwiseError, PROVIDER_HEADER, SESSION_HEADER, SessionId,
    TextStream,
};
use serde::Serialize;
use tracing::debug;

/// What the server answered.
pub enum RemoteReply {
    /// A text stream from the named provider.
    Stream { provider: String, stream: TextStream },
    /// The server has no provider configured.
    Fallback,
}

impl std::fmt::Debug for RemoteReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream { provider, .. } => f.debug_struct("Stream").field("provider", provider).finish_non_exhaustive(),
            Self::Fallback => f.write_str("Fallback"),
        }
    }
}

/// Sends a conversation to the remote chat endpoint.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        session: &SessionId,
        messages: &[ChatMessage],
    ) -> Result<RemoteReply, LeadwiseError>;
}

#[derive(Serialize)]
struct ChatBody<'a> {
    messages: &'a [ChatMessage],
}

/// `POST {server_url}/api/chat` over reqwest.
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpChatTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, LeadwiseError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LeadwiseError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: format!("{}/api/chat", config.server_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(
        &self,
        session: &SessionId,
        messages: &[ChatMessage],
    ) -> Result<RemoteReply, LeadwiseError> {
        let response = self
            .client
            .post(&self.url)
            .header(SESSION_HEADER, session.as_str())
            .json(&ChatBody { messages })
            .send()
            .await
            .map_err(|e| LeadwiseError::Provider {
                message: format!("chat request failed: {e}"),
                retryable: true,
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let provider = response
            .headers()
            .get(PROVIDER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(session_id = %session, status = %status, provider = provider.as_deref().unwrap_or("-"), "chat response");

        if provider.as_deref() == Some(FALLBACK_PROVIDER) {
            return Ok(RemoteReply::Fallback);
        }
        if !status.is_success() {
            return Err(status_error(status));
        }
        Ok(RemoteReply::Stream {
            provider: provider.unwrap_or_else(|| "remote".to_string()),
            stream: utf8_stream(response.bytes_stream().boxed()),
        })
    }
}

/// Client errors other than timeouts and rate limits would fail the same way
/// again, so they are not retried.
fn status_error(status: reqwest::StatusCode) -> LeadwiseError {
    let message = format!("chat server returned {status}");
    match status {
        reqwest::StatusCode::REQUEST_TIMEOUT | reqwest::StatusCode::TOO_MANY_REQUESTS => {
            LeadwiseError::transient(message)
        }
        s if s.is_client_error() => LeadwiseError::permanent(message),
        _ => LeadwiseError::transient(message),
    }
}

/// Decodes a byte stream as UTF-8, holding back characters split across
/// network chunks.
pub fn utf8_stream(bytes: BoxStream<'static, Result<Bytes, reqwest::Error>>) -> TextStream {
    let decoded = stream::unfold(
        (bytes, Vec::<u8>::new(), false),
        |(mut bytes, mut carry, done)| async move {
            if done {
                return None;
            }
            loop {
                match bytes.next().await {
                    Some(Ok(chunk)) => {
                        carry.extend_from_slice(&chunk);
                        let valid = match std::str::from_utf8(&carry) {
                            Ok(_) => carry.len(),
                            Err(e) if e.error_len().is_none() => e.valid_up_to(),
                            Err(e) => {
                                let err = LeadwiseError::permanent(format!("reply is not UTF-8: {e}"));
                                return Some((Err(err), (bytes, carry, true)));
                            }
                        };
                        if valid == 0 {
                            continue;
                        }
                        let rest = carry.split_off(valid);
                        let text = String::from_utf8_lossy(&carry).into_owned();
                        return Some((Ok(text), (bytes, rest, false)));
                    }
                    Some(Err(e)) => {
                        let err = LeadwiseError::Provider {
                            message: format!("reply stream interrupted: {e}"),
                            retryable: true,
                            source: Some(Box::new(e)),
                        };
                        return Some((Err(err), (bytes, carry, true)));
                    }
                    None if carry.is_empty() => return None,
                    None => {
                        let err = LeadwiseError::permanent("reply ended inside a UTF-8 sequence");
                        return Some((Err(err), (bytes, Vec::new(), true)));
                    }
                }
            }
        },
    );
    Box::pin(decoded)
}
