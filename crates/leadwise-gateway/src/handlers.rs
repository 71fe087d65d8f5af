// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers: POST /api/chat, GET /api/health,
//! GET /api/analytics/report.

use std::time::Instant;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, StreamExt};
use leadwise_analytics::AnalyticsEvent;
use leadwise_core::{
    ChatMessage, FALLBACK_PROVIDER, LeadwiseError, PROVIDER_HEADER, Role, SESSION_HEADER, SessionId,
    TextStream, Tier,
};
use leadwise_router::HealthReport;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::server::GatewayState;

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Set when the client should answer with its own fallback tiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

/// Parses and checks the chat payload.
pub fn parse_chat_request(body: &[u8]) -> Result<Vec<ChatMessage>, LeadwiseError> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| LeadwiseError::InvalidRequest(format!("malformed payload: {e}")))?;
    if request.messages.is_empty() {
        return Err(LeadwiseError::InvalidRequest(
            "messages must be a non-empty array".into(),
        ));
    }
    if !request.messages.iter().any(|m| m.role == Role::User) {
        return Err(LeadwiseError::InvalidRequest(
            "messages must include a user message".into(),
        ));
    }
    Ok(request.messages)
}

fn session_from(headers: &HeaderMap) -> SessionId {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(SessionId::from)
        .unwrap_or_else(|| SessionId::new(uuid::Uuid::new_v4().to_string()))
}

fn error_response(
    status: StatusCode,
    session: &SessionId,
    provider: Option<&str>,
    body: ErrorResponse,
) -> Response {
    let mut response = (status, Json(body)).into_response();
    insert_header(&mut response, SESSION_HEADER, session.as_str());
    if let Some(provider) = provider {
        insert_header(&mut response, PROVIDER_HEADER, provider);
    }
    response
}

fn insert_header(response: &mut Response, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers_mut().insert(name, value);
    }
}

fn fallback_response(session: &SessionId) -> Response {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        session,
        Some(FALLBACK_PROVIDER),
        ErrorResponse {
            error: "No AI provider configured".into(),
            fallback: Some(true),
        },
    )
}

/// POST /api/chat
///
/// Streams the reply as plain text. The body is parsed by hand so malformed
/// payloads get the structured 400 instead of axum's rejection text.
pub async fn post_chat(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session = session_from(&headers);
    let messages = match parse_chat_request(&body) {
        Ok(messages) => messages,
        Err(e) => {
            debug!(session_id = %session, error = %e, "rejected chat request");
            return error_response(
                StatusCode::BAD_REQUEST,
                &session,
                None,
                ErrorResponse {
                    error: e.to_string(),
                    fallback: None,
                },
            );
        }
    };

    if !state.chain.is_configured() {
        info!(session_id = %session, "no provider configured, client falls back");
        return fallback_response(&session);
    }

    let user_text = messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.clone())
        .unwrap_or_default();
    record(&state, &session, AnalyticsEvent::MessageSent {
        chars: user_text.chars().count(),
    })
    .await;

    let industry = session_industry(&state, &session).await;
    let prompt = state.prompts.prepare(&messages, industry.as_deref());
    let started = Instant::now();
    let opened = match state.chain.stream(&prompt.messages, Some(&prompt.system)).await {
        Ok(opened) => opened,
        Err(LeadwiseError::NoProviderConfigured) => return fallback_response(&session),
        Err(e) => {
            warn!(session_id = %session, error = %e, "provider chain exhausted");
            return error_response(
                StatusCode::BAD_GATEWAY,
                &session,
                None,
                ErrorResponse {
                    error: "All AI providers failed".into(),
                    fallback: Some(true),
                },
            );
        }
    };

    info!(
        session_id = %session,
        provider = %opened.provider,
        history = prompt.messages.len(),
        "streaming reply"
    );
    let recorder = TurnRecorder {
        state: state.clone(),
        session: session.clone(),
        user_text,
        provider: opened.provider.clone(),
        started,
    };

    let mut response = Response::new(Body::from_stream(reply_body(opened.stream, recorder)));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    insert_header(&mut response, PROVIDER_HEADER, &opened.provider);
    insert_header(&mut response, SESSION_HEADER, session.as_str());
    response
}

/// Industry the session has stated so far, if any.
async fn session_industry(state: &GatewayState, session: &SessionId) -> Option<String> {
    match state.memory.get_context(session).await {
        Ok(memory) => memory.and_then(|m| m.profile.industry),
        Err(e) => {
            warn!(session_id = %session, error = %e, "failed to load session memory");
            None
        }
    }
}

/// Forwards chunks and records the exchange once the stream ends.
///
/// A mid-stream provider error fails the body, so the client sees a broken
/// transfer and retries instead of keeping a truncated reply. Nothing is
/// recorded for an aborted turn.
fn reply_body(
    text: TextStream,
    recorder: TurnRecorder,
) -> impl futures::Stream<Item = Result<Bytes, std::io::Error>> + Send {
    stream::unfold(Some((text, String::new(), recorder)), |state| async move {
        let (mut text, mut reply, recorder) = state?;
        match text.next().await {
            Some(Ok(chunk)) => {
                reply.push_str(&chunk);
                Some((Ok(Bytes::from(chunk)), Some((text, reply, recorder))))
            }
            Some(Err(e)) => {
                warn!(
                    session_id = %recorder.session,
                    provider = %recorder.provider,
                    error = %e,
                    sent = reply.len(),
                    "stream failed, aborting reply"
                );
                Some((Err(std::io::Error::other(e.to_string())), None))
            }
            None => {
                recorder.finish(reply).await;
                None
            }
        }
    })
}

struct TurnRecorder {
    state: GatewayState,
    session: SessionId,
    user_text: String,
    provider: String,
    started: Instant,
}

impl TurnRecorder {
    async fn finish(self, reply: String) {
        if reply.is_empty() {
            return;
        }
        let latency_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if let Err(e) = self
            .state
            .memory
            .record_exchange(&self.session, &self.user_text, &reply)
            .await
        {
            warn!(session_id = %self.session, error = %e, "failed to record exchange");
            return;
        }
        match self.state.leads.update_lead(&self.session).await {
            Ok(lead) => {
                record(&self.state, &self.session, AnalyticsEvent::LeadUpdated {
                    score: lead.score,
                    level: lead.level,
                })
                .await;
            }
            Err(e) => warn!(session_id = %self.session, error = %e, "failed to update lead"),
        }
        record(&self.state, &self.session, AnalyticsEvent::ResponseCompleted {
            tier: Tier::Remote,
            provider: Some(self.provider),
            latency_ms,
            chars: reply.chars().count(),
        })
        .await;
    }
}

async fn record(state: &GatewayState, session: &SessionId, event: AnalyticsEvent) {
    if let Err(e) = state.analytics.record(session, event).await {
        warn!(session_id = %session, error = %e, "failed to record analytics event");
    }
}

/// GET /api/health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    let providers = state.chain.providers();
    let remote_available = !providers.is_empty();
    Json(HealthReport {
        status: if remote_available { "ok" } else { "degraded" }.to_string(),
        remote_available,
        primary: state.chain.primary().map(str::to_string),
        providers,
    })
}

/// GET /api/analytics/report
pub async fn get_report(State(state): State<GatewayState>) -> Response {
    match state.analytics.report().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to build analytics report");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "report unavailable".into(),
                    fallback: None,
                }),
            )
                .into_response()
        }
    }
}
