// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use leadwise_config::{ClientConfig, LocalConfig};
use leadwise_core::Tier;
use leadwise_router::{HttpRemoteProbe, LocalCapability, ModelRouter, OllamaCapability, RemoteProbe};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_config(server_url: &str) -> ClientConfig {
    ClientConfig {
        server_url: server_url.to_string(),
        probe_timeout_ms: 500,
        ..ClientConfig::default()
    }
}

fn local_config(endpoint: &str) -> LocalConfig {
    LocalConfig {
        endpoint: endpoint.to_string(),
        ..LocalConfig::default()
    }
}

#[tokio::test]
async fn remote_probe_parses_health_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "remote_available": true,
            "providers": ["groq", "openai"],
            "primary": "groq"
        })))
        .mount(&server)
        .await;

    let probe = HttpRemoteProbe::new(&client_config(&server.uri())).unwrap();
    let report = probe.probe().await.unwrap();
    assert!(report.remote_available);
    assert_eq!(report.providers, vec!["groq", "openai"]);
    assert_eq!(report.primary.as_deref(), Some("groq"));
}

#[tokio::test]
async fn remote_probe_error_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let probe = HttpRemoteProbe::new(&client_config(&server.uri())).unwrap();
    assert!(probe.probe().await.is_err());
}

#[tokio::test]
async fn slow_probe_times_out_and_router_still_prefers_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = client_config(&server.uri());
    let router = ModelRouter::from_config(&config, &local_config(&server.uri())).unwrap();
    let choice = router.choose_model().await;
    assert_eq!(choice.tier, Tier::Remote);
    assert!(choice.provider.is_none());
}

#[tokio::test]
async fn ollama_capability_checks_tags_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
        .mount(&server)
        .await;

    let local = OllamaCapability::new(&local_config(&server.uri()), Duration::from_millis(500)).unwrap();
    assert!(local.available().await);

    let disabled = LocalConfig {
        enabled: false,
        ..local_config(&server.uri())
    };
    let local = OllamaCapability::new(&disabled, Duration::from_millis(500)).unwrap();
    assert!(!local.available().await);
}

#[tokio::test]
async fn unconfigured_server_and_no_local_runtime_selects_rules() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "degraded",
            "remote_available": false,
            "providers": []
        })))
        .mount(&server)
        .await;

    // No /api/tags mock: wiremock answers 404.
    let router =
        ModelRouter::from_config(&client_config(&server.uri()), &local_config(&server.uri())).unwrap();
    assert_eq!(router.choose_model().await.tier, Tier::Rules);
}
