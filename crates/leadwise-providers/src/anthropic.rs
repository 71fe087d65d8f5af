// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API streaming.

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::future::ready;
use futures::stream::StreamExt;
use leadwise_config::ProviderConfig;
use leadwise_core::{ChatMessage, LeadwiseError, Role, TextGenerator, TextStream};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frames::{Frame, into_text_stream};
use crate::http::{build_client, send_error, status_error};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ContentBlockDelta {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEvent {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Streams from the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicGenerator {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, LeadwiseError> {
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| LeadwiseError::Config("anthropic has no API key".into()))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(key)
                .map_err(|e| LeadwiseError::Config(format!("invalid anthropic API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(Self {
            client: build_client(headers, timeout)?,
            url: format!("{}/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<TextStream, LeadwiseError> {
        // The Messages API takes system text as a top-level field only.
        let mut system: Vec<&str> = system_prompt.into_iter().collect();
        system.extend(
            messages
                .iter()
                .filter(|m| m.role == Role::System)
                .map(|m| m.content.as_str()),
        );
        let request = MessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages: messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            stream: true,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("anthropic", e))?;
        let status = response.status();
        debug!(provider = "anthropic", status = %status, messages = messages.len(), "stream opened");
        if !status.is_success() {
            return Err(status_error("anthropic", response).await);
        }

        let frames = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| ready(decode(event)));
        Ok(into_text_stream(frames))
    }
}

fn decode<E: std::fmt::Display>(
    event: Result<eventsource_stream::Event, E>,
) -> Option<Result<Frame, LeadwiseError>> {
    let event = match event {
        Ok(event) => event,
        Err(e) => return Some(Err(LeadwiseError::transient(format!("SSE stream error: {e}")))),
    };
    match event.event.as_str() {
        "content_block_delta" => match serde_json::from_str::<ContentBlockDelta>(&event.data) {
            Ok(ContentBlockDelta {
                delta: Delta::TextDelta { text },
            }) => Some(Ok(Frame::Text(text))),
            Ok(_) => None,
            Err(e) => Some(Err(LeadwiseError::Provider {
                message: format!("failed to parse content_block_delta: {e}"),
                retryable: false,
                source: Some(Box::new(e)),
            })),
        },
        "message_stop" => Some(Ok(Frame::Done)),
        "error" => {
            let message = serde_json::from_str::<ErrorEvent>(&event.data)
                .map(|e| format!("{}: {}", e.error.kind, e.error.message))
                .unwrap_or_else(|_| "unreadable error event".to_string());
            Some(Err(LeadwiseError::transient(format!(
                "anthropic stream error ({message})"
            ))))
        }
        // message_start, content_block_start/stop, message_delta, ping and
        // any future event types carry no text.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(base_url: &str) -> AnthropicGenerator {
        let mut config = leadwise_config::ProvidersConfig::default().anthropic;
        config.api_key = Some("sk-ant-test".into());
        config.base_url = base_url.to_string();
        AnthropicGenerator::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn streams_text_deltas() {
        let server = MockServer::start().await;
        let body = concat!(
            "event: message_start\ndata: {\"message\":{\"id\":\"m\"}}\n\n",
            "event: ping\ndata: {}\n\n",
            "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Good\"}}\n\n",
            "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" morning\"}}\n\n",
            "event: message_stop\ndata: {}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(serde_json::json!({
                "system": "persona\n\nvisitor context",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let messages = [ChatMessage::system("visitor context"), ChatMessage::user("hello")];
        let stream = generator(&server.uri())
            .generate(&messages, Some("persona"))
            .await
            .unwrap();
        let text: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(text.concat(), "Good morning");
    }

    #[tokio::test]
    async fn error_event_becomes_error() {
        let server = MockServer::start().await;
        let body = "event: error\ndata: {\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n";
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;
        let mut stream = generator(&server.uri())
            .generate(&[ChatMessage::user("hi")], None)
            .await
            .unwrap();
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("overloaded_error"), "{err}");
    }

    #[tokio::test]
    async fn overloaded_status_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529))
            .mount(&server)
            .await;
        let err = generator(&server.uri())
            .generate(&[ChatMessage::user("hi")], None)
            .await
            .err()
            .unwrap();
        assert!(err.is_retryable());
    }
}
