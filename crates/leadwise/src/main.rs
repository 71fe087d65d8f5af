// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadwise - AI sales assistant.
//!
//! Binary entry point: the chat gateway, an interactive client, and a
//! config inspector.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod config_cmd;
mod serve;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use leadwise_config::LeadwiseConfig;

/// Leadwise - AI sales assistant.
#[derive(Parser, Debug)]
#[command(name = "leadwise", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the chat gateway.
    Serve,
    /// Chat with the assistant from the terminal.
    Chat {
        /// Resume under an existing session id.
        #[arg(long)]
        session: Option<String>,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return;
    };

    let loaded = match &cli.config {
        Some(path) => leadwise_config::load_and_validate_path(path),
        None => leadwise_config::load_and_validate(),
    };
    let config: LeadwiseConfig = match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadwise_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    if !matches!(command, Commands::Config) {
        init_tracing(&config.agent.log_level);
    }

    let outcome = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Chat { session } => chat::run_chat(config, session).await,
        Commands::Config => config_cmd::print_config(&config),
    };
    if let Err(e) = outcome {
        eprintln!("{} {e}", "leadwise:".red().bold());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the config.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadwise={log_level},warn")));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .init();
}
