// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use leadwise_analytics::Analytics;
use leadwise_config::{LeadwiseConfig, ServerConfig};
use leadwise_core::{LeadwiseError, PROVIDER_HEADER, SESSION_HEADER};
use leadwise_lead::LeadQualifier;
use leadwise_memory::ConversationMemory;
use leadwise_providers::{PromptBuilder, ProviderChain};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub chain: ProviderChain,
    pub prompts: Arc<PromptBuilder>,
    /// Operator-side view of every session served by this process.
    pub memory: ConversationMemory,
    pub leads: LeadQualifier,
    pub analytics: Analytics,
}

impl GatewayState {
    pub fn new(chain: ProviderChain, prompts: PromptBuilder) -> Self {
        let memory = ConversationMemory::default();
        let leads = LeadQualifier::in_memory(memory.clone());
        let analytics = Analytics::in_memory(leads.clone());
        Self {
            chain,
            prompts: Arc::new(prompts),
            memory,
            leads,
            analytics,
        }
    }

    pub fn from_config(config: &LeadwiseConfig) -> Result<Self, LeadwiseError> {
        Ok(Self::new(
            ProviderChain::from_config(config)?,
            PromptBuilder::from_config(config),
        ))
    }
}

/// Routes and middleware, without binding a socket.
pub fn router(state: GatewayState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/chat", post(handlers::post_chat))
        .route("/api/health", get(handlers::get_health))
        .route("/api/analytics/report", get(handlers::get_report))
        .with_state(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let exposed = [
        HeaderName::from_static(PROVIDER_HEADER),
        HeaderName::from_static(SESSION_HEADER),
    ];
    if origins.is_empty() {
        return CorsLayer::permissive().expose_headers(exposed);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(SESSION_HEADER),
        ])
        .expose_headers(exposed)
}

/// Binds the configured address and serves until `shutdown` resolves.
pub async fn serve(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), LeadwiseError> {
    let providers = state.chain.providers();
    let app = router(state, config);
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LeadwiseError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(%addr, providers = ?providers, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| LeadwiseError::Internal(format!("gateway server error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_without_providers_is_degraded() {
        let state = GatewayState::from_config(&LeadwiseConfig::default()).unwrap();
        assert!(!state.chain.is_configured());
        assert!(state.chain.providers().is_empty());
    }

    #[test]
    fn cors_accepts_configured_origins() {
        let _ = cors_layer(&["https://leadwise.dev".to_string()]);
        let _ = cors_layer(&[]);
    }
}
