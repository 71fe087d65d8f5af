// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::StreamExt;
use leadwise_agent::{
    ChatTransport, Dependencies, HttpChatTransport, Orchestrator, REMOTE_UNAVAILABLE_NOTICE,
    RemoteReply, TurnOutcome,
};
use leadwise_analytics::Analytics;
use leadwise_config::{ClientConfig, LocalConfig};
use leadwise_core::{ChatMessage, SessionId, Tier};
use leadwise_lead::LeadQualifier;
use leadwise_memory::ConversationMemory;
use leadwise_providers::{OllamaGenerator, PromptBuilder};
use leadwise_rag::KnowledgeBase;
use leadwise_router::ModelRouter;
use leadwise_rules::RulesEngine;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_config(server_url: &str) -> ClientConfig {
    ClientConfig {
        server_url: server_url.to_string(),
        probe_timeout_ms: 500,
        request_timeout_secs: 5,
        ..ClientConfig::default()
    }
}

fn orchestrator(server_url: &str, session: &str) -> Orchestrator {
    let client = client_config(server_url);
    let local = LocalConfig {
        enabled: false,
        ..LocalConfig::default()
    };
    let memory = ConversationMemory::default();
    let leads = LeadQualifier::in_memory(memory);
    let deps = Dependencies {
        router: ModelRouter::from_config(&client, &local).unwrap(),
        transport: Arc::new(HttpChatTransport::new(&client).unwrap()),
        local: Arc::new(OllamaGenerator::new(&local, Duration::from_secs(1)).unwrap()),
        rules: RulesEngine::in_memory(5, "team@leadwise.test"),
        analytics: Analytics::in_memory(leads.clone()),
        leads,
        prompts: PromptBuilder::new("You are a test assistant.", KnowledgeBase::default(), 0.5, 20),
    };
    Orchestrator::new(SessionId::from(session), deps, Duration::from_millis(10))
}

const HEALTHY: &str = r#"{"status":"ok","remote_available":true,"providers":["groq"],"primary":"groq"}"#;

async fn mount_health(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(HEALTHY, "application/json"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn streams_reply_with_provider_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("x-session-id", "visitor-1"))
        .and(body_partial_json(serde_json::json!({
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ai-provider", "groq")
                .insert_header("content-type", "text/plain; charset=utf-8")
                .set_body_string("Hi! How can I help?"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpChatTransport::new(&client_config(&server.uri())).unwrap();
    let reply = transport
        .send(&SessionId::from("visitor-1"), &[ChatMessage::user("hello")])
        .await
        .unwrap();
    let RemoteReply::Stream { provider, stream } = reply else {
        panic!("expected a stream");
    };
    assert_eq!(provider, "groq");
    let text: String = stream.map(|chunk| chunk.unwrap()).collect().await;
    assert_eq!(text, "Hi! How can I help?");
}

#[tokio::test]
async fn fallback_header_is_a_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("x-ai-provider", "fallback")
                .set_body_json(serde_json::json!({
                    "error": "No AI provider configured",
                    "fallback": true
                })),
        )
        .mount(&server)
        .await;

    let transport = HttpChatTransport::new(&client_config(&server.uri())).unwrap();
    let reply = transport
        .send(&SessionId::from("s"), &[ChatMessage::user("hello")])
        .await
        .unwrap();
    assert!(matches!(reply, RemoteReply::Fallback));
}

#[tokio::test]
async fn gateway_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({
            "error": "All AI providers failed",
            "fallback": true
        })))
        .mount(&server)
        .await;

    let transport = HttpChatTransport::new(&client_config(&server.uri())).unwrap();
    let err = transport
        .send(&SessionId::from("s"), &[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn rejected_request_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Invalid request: messages must not be empty"
        })))
        .mount(&server)
        .await;

    let transport = HttpChatTransport::new(&client_config(&server.uri())).unwrap();
    let err = transport
        .send(&SessionId::from("s"), &[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("400"));
}

#[tokio::test]
async fn unreachable_server_is_retryable() {
    let transport = HttpChatTransport::new(&client_config("http://127.0.0.1:1")).unwrap();
    let err = transport
        .send(&SessionId::from("s"), &[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn orchestrator_talks_to_gateway_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "remote_available": true,
            "providers": ["anthropic"],
            "primary": "anthropic"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("x-session-id", "http-session"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ai-provider", "anthropic")
                .set_body_string("Our chatbots launch in two to four weeks."),
        )
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server.uri(), "http-session");

    let outcome = orchestrator.send_message("How long does a chatbot take?").await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            reply: "Our chatbots launch in two to four weeks.".into(),
            tier: Tier::Remote,
            provider: Some("anthropic".into()),
        }
    );
    let lead = orchestrator.lead().await.unwrap().unwrap();
    assert!(lead.score >= 0.0 && lead.score <= 10.0);
}

#[tokio::test]
async fn rejected_request_goes_straight_to_rules() {
    let server = MockServer::start().await;
    mount_health(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Invalid request: bad message"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server.uri(), "bad-request");
    let outcome = orchestrator.send_message("hello").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Completed { tier: Tier::Rules, .. }));
    assert_eq!(
        orchestrator.state().error.as_deref(),
        Some(REMOTE_UNAVAILABLE_NOTICE)
    );
    server.verify().await;
}

/// Reads one request: headers plus a `content-length` body.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn complete_response(body: &str, content_type: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nx-ai-provider: groq\r\ncontent-type: {content_type}\r\n\
         content-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// A gateway whose first chat reply breaks off mid-body. Later replies
/// arrive whole. Returns the base url and a chat request counter.
async fn flaky_gateway(reply: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let chats = Arc::new(AtomicUsize::new(0));
    let counter = chats.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let request = read_request(&mut socket).await;
            let response = if request.starts_with("GET /api/health") {
                complete_response(HEALTHY, "application/json")
            } else if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                "HTTP/1.1 200 OK\r\nx-ai-provider: groq\r\ncontent-type: text/plain\r\n\
                 transfer-encoding: chunked\r\nconnection: close\r\n\r\ne\r\nOur pricing st\r\n"
                    .to_string()
            } else {
                complete_response(reply, "text/plain; charset=utf-8")
            };
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (url, chats)
}

#[tokio::test]
async fn interrupted_gateway_stream_is_retried() {
    let full = "Our pricing starts with a fixed-price discovery sprint.";
    let (url, chats) = flaky_gateway(full).await;
    let orchestrator = orchestrator(&url, "flaky-session");

    let outcome = orchestrator.send_message("What does pricing look like?").await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            reply: full.into(),
            tier: Tier::Remote,
            provider: Some("groq".into()),
        }
    );
    assert_eq!(chats.load(Ordering::SeqCst), 2);

    let memory = orchestrator
        .memory()
        .get_context(&SessionId::from("flaky-session"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(memory.turns.len(), 1);
    assert_eq!(memory.turns[0].ai_text, full);
}
