// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: a client orchestrator talking HTTP to a live gateway
//! whose providers are scripted.

use std::sync::Arc;
use std::time::Duration;

use leadwise_agent::{Dependencies, HttpChatTransport, Orchestrator, TurnOutcome};
use leadwise_analytics::Analytics;
use leadwise_config::{ClientConfig, LocalConfig, ServerConfig};
use leadwise_core::{SessionId, TextGenerator, Tier};
use leadwise_gateway::{GatewayState, router};
use leadwise_lead::LeadQualifier;
use leadwise_memory::ConversationMemory;
use leadwise_providers::{OllamaGenerator, PromptBuilder, ProviderChain, RetryPolicy};
use leadwise_rag::KnowledgeBase;
use leadwise_router::ModelRouter;
use leadwise_rules::{GREETING, RulesEngine};
use leadwise_test_utils::{MockGenerator, Script};

struct Stack {
    gateway: GatewayState,
    client: Orchestrator,
}

/// Serves a gateway on an ephemeral port and points a client at it.
async fn stack(generators: Vec<Arc<dyn TextGenerator>>) -> Stack {
    let policy = RetryPolicy {
        attempts: 3,
        initial_backoff: Duration::from_millis(1),
    };
    let gateway = GatewayState::new(
        ProviderChain::new(generators, policy),
        PromptBuilder::new("You are a test assistant.", KnowledgeBase::default(), 0.5, 20),
    );
    let app = router(gateway.clone(), &ServerConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client_config = ClientConfig {
        server_url: format!("http://{addr}"),
        probe_timeout_ms: 1_000,
        request_timeout_secs: 5,
        ..ClientConfig::default()
    };
    let local = LocalConfig {
        enabled: false,
        ..LocalConfig::default()
    };
    let leads = LeadQualifier::in_memory(ConversationMemory::default());
    let deps = Dependencies {
        router: ModelRouter::from_config(&client_config, &local).unwrap(),
        transport: Arc::new(HttpChatTransport::new(&client_config).unwrap()),
        local: Arc::new(OllamaGenerator::new(&local, Duration::from_secs(1)).unwrap()),
        rules: RulesEngine::in_memory(5, "team@leadwise.test"),
        analytics: Analytics::in_memory(leads.clone()),
        leads,
        prompts: PromptBuilder::new("You are a test assistant.", KnowledgeBase::default(), 0.5, 20),
    };
    let client = Orchestrator::new(SessionId::from("e2e"), deps, Duration::from_millis(10));
    Stack { gateway, client }
}

#[tokio::test]
async fn conversation_flows_through_gateway() {
    let groq: Arc<dyn TextGenerator> = Arc::new(MockGenerator::with_script(
        "groq",
        vec![
            Script::chunks(&["Great to meet you! ", "What does your team sell?"]),
            Script::reply("A $50k budget gives us plenty of room."),
        ],
    ));
    let stack = stack(vec![groq]).await;

    let first = stack.client.send_message("Hi, I'm the CEO of a saas company").await.unwrap();
    assert_eq!(
        first,
        TurnOutcome::Completed {
            reply: "Great to meet you! What does your team sell?".into(),
            tier: Tier::Remote,
            provider: Some("groq".into()),
        }
    );
    let before = stack.client.lead().await.unwrap().unwrap();

    stack
        .client
        .send_message("Our budget is $50k and we need this within a month")
        .await
        .unwrap();
    let after = stack.client.lead().await.unwrap().unwrap();
    assert!(after.score >= before.score);
    assert!(after.factors.budget > before.factors.budget);
    assert!(after.factors.timeline > before.factors.timeline);

    // The gateway keeps its own operator-side record of the session.
    let session = SessionId::from("e2e");
    let memory = stack.gateway.memory.get_context(&session).await.unwrap().unwrap();
    assert_eq!(memory.turns.len(), 2);
    let report = stack.gateway.analytics.report().await.unwrap();
    assert_eq!(report.total_sessions, 1);
}

#[tokio::test]
async fn provider_outage_still_gets_a_reply() {
    let groq: Arc<dyn TextGenerator> = Arc::new(MockGenerator::with_script(
        "groq",
        vec![
            Script::transient("503"),
            Script::transient("503"),
            Script::transient("503"),
        ],
    ));
    let anthropic: Arc<dyn TextGenerator> = Arc::new(MockGenerator::with_script(
        "anthropic",
        vec![Script::reply("Backup model here.")],
    ));
    let stack = stack(vec![groq, anthropic]).await;

    let outcome = stack.client.send_message("hello").await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            reply: "Backup model here.".into(),
            tier: Tier::Remote,
            provider: Some("anthropic".into()),
        }
    );
}

#[tokio::test]
async fn broken_stream_is_retried_and_recorded_once() {
    let groq: Arc<dyn TextGenerator> = Arc::new(MockGenerator::with_script(
        "groq",
        vec![
            Script::Interrupted(vec!["Our pricing st".into()]),
            Script::reply("Our pricing starts at $2,000."),
        ],
    ));
    let stack = stack(vec![groq]).await;

    let outcome = stack.client.send_message("What does pricing look like?").await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            reply: "Our pricing starts at $2,000.".into(),
            tier: Tier::Remote,
            provider: Some("groq".into()),
        }
    );

    let session = SessionId::from("e2e");
    let memory = stack.gateway.memory.get_context(&session).await.unwrap().unwrap();
    assert_eq!(memory.turns.len(), 1);
    assert_eq!(memory.turns[0].ai_text, "Our pricing starts at $2,000.");
}

#[tokio::test]
async fn total_outage_degrades_to_rules() {
    let groq: Arc<dyn TextGenerator> = Arc::new(MockGenerator::with_script(
        "groq",
        vec![Script::permanent("invalid key"), Script::permanent("invalid key")],
    ));
    let stack = stack(vec![groq]).await;

    let outcome = stack.client.send_message("what does it cost").await.unwrap();
    let TurnOutcome::Completed { reply, tier, .. } = outcome else {
        panic!("expected a reply");
    };
    assert_eq!(tier, Tier::Rules);
    assert_eq!(reply, GREETING);
}

#[tokio::test]
async fn unconfigured_gateway_routes_client_to_rules() {
    let stack = stack(Vec::new()).await;
    let outcome = stack.client.send_message("hello there").await.unwrap();
    let TurnOutcome::Completed { reply, tier, .. } = outcome else {
        panic!("expected a reply");
    };
    assert_eq!(tier, Tier::Rules);
    assert!(!reply.trim().is_empty());
}
