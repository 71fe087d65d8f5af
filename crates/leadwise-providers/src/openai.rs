// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat completions (groq, together, openai).

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::future::ready;
use futures::stream::StreamExt;
use leadwise_config::ProviderConfig;
use leadwise_core::{ChatMessage, LeadwiseError, Role, TextGenerator, TextStream};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frames::{Frame, into_text_stream};
use crate::http::{build_client, send_error, status_error};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Streams from any `/chat/completions` endpoint that speaks OpenAI SSE.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleGenerator {
    name: String,
    client: reqwest::Client,
    url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompatibleGenerator {
    pub fn new(
        name: impl Into<String>,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Self, LeadwiseError> {
        let name = name.into();
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| LeadwiseError::Config(format!("{name} has no API key")))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| LeadwiseError::Config(format!("invalid {name} API key: {e}")))?,
        );
        Ok(Self {
            client: build_client(headers, timeout)?,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            name,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    fn name(&self) -> &str {
        &self.name
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
            max_tokens: self.max_tokens,
            stream: true,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(&self.name, e))?;
        let status = response.status();
        debug!(provider = %self.name, status = %status, messages = messages.len(), "stream opened");
        if !status.is_success() {
            return Err(status_error(&self.name, response).await);
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
    let data = event.data.trim();
    if data == "[DONE]" {
        return Some(Ok(Frame::Done));
    }
    if data.is_empty() {
        return None;
    }
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(StreamChunk {
            error: Some(err), ..
        }) => Some(Err(LeadwiseError::transient(format!(
            "provider stream error: {}",
            err.message
        )))),
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .map(|text| Ok(Frame::Text(text))),
        Err(e) => Some(Err(LeadwiseError::Provider {
            message: format!("malformed stream chunk: {e}"),
            retryable: false,
            source: Some(Box::new(e)),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> ProviderConfig {
        let mut config: ProviderConfig = leadwise_config::ProvidersConfig::default().groq;
        config.api_key = Some("gsk-test".into());
        config.base_url = base_url.to_string();
        config
    }

    fn sse(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/event-stream")
            .set_body_string(body.to_string())
    }

    #[tokio::test]
    async fn streams_deltas_until_done() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .and(body_partial_json(serde_json::json!({
                "stream": true,
                "messages": [{"role": "system", "content": "be brief"}, {"role": "user", "content": "hi"}]
            })))
            .respond_with(sse(body))
            .mount(&server)
            .await;

        let generator =
            OpenAiCompatibleGenerator::new("groq", &config(&server.uri()), Duration::from_secs(5)).unwrap();
        let stream = generator
            .generate(&[ChatMessage::user("hi")], Some("be brief"))
            .await
            .unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.concat(), "Hello there");
    }

    #[tokio::test]
    async fn error_statuses_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "bad key"}
            })))
            .mount(&server)
            .await;
        let generator =
            OpenAiCompatibleGenerator::new("groq", &config(&server.uri()), Duration::from_secs(5)).unwrap();
        let err = generator.generate(&[ChatMessage::user("hi")], None).await.err().unwrap();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("bad key"), "{err}");
    }

    #[tokio::test]
    async fn mid_stream_error_surfaces() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: {\"error\":{\"message\":\"overloaded\"}}\n\n",
        );
        Mock::given(method("POST")).respond_with(sse(body)).mount(&server).await;
        let generator =
            OpenAiCompatibleGenerator::new("groq", &config(&server.uri()), Duration::from_secs(5)).unwrap();
        let items: Vec<_> = generator
            .generate(&[ChatMessage::user("hi")], None)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let config = leadwise_config::ProvidersConfig::default().openai;
        let err = OpenAiCompatibleGenerator::new("openai", &config, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, LeadwiseError::Config(_)));
    }
}
