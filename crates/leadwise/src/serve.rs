// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadwise serve` command implementation.

use leadwise_config::LeadwiseConfig;
use leadwise_core::LeadwiseError;
use leadwise_gateway::GatewayState;
use tracing::{info, warn};

/// Runs the chat gateway until Ctrl+C.
pub async fn run_serve(config: LeadwiseConfig) -> Result<(), LeadwiseError> {
    leadwise_providers::register_metrics();
    leadwise_analytics::register_metrics();

    let state = GatewayState::from_config(&config)?;
    if state.chain.is_configured() {
        info!(
            providers = ?state.chain.providers(),
            primary = state.chain.primary().unwrap_or("-"),
            "provider chain ready"
        );
    } else {
        warn!("no AI provider configured; clients will answer locally or from rules");
    }

    leadwise_gateway::serve(&config.server, state, shutdown_signal()).await?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => warn!(error = %e, "failed to listen for shutdown signal"),
    }
}
