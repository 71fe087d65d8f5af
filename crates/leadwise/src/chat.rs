// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadwise chat` command implementation.
//!
//! A readline REPL over one [`Orchestrator`] session. Replies are printed as
//! they stream in; Ctrl+C during a reply cancels it, Ctrl+C at the prompt
//! exits. The lead score is shown after every completed turn.

use std::io::Write;
use std::sync::Arc;

use colored::Colorize;
use leadwise_agent::{ChatState, Orchestrator, TurnOutcome};
use leadwise_config::LeadwiseConfig;
use leadwise_core::{LeadLevel, LeadwiseError, SessionId};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// Runs the `leadwise chat` REPL.
pub async fn run_chat(config: LeadwiseConfig, session: Option<String>) -> Result<(), LeadwiseError> {
    let session = SessionId::from(session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()));
    let orchestrator = Arc::new(Orchestrator::from_config(&config, session)?);

    let mut rl = DefaultEditor::new()
        .map_err(|e| LeadwiseError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} chat", config.agent.name).bold().green());
    println!(
        "Type {} to exit, {} for the lead profile, {} for session stats.\n",
        "/quit".yellow(),
        "/lead".yellow(),
        "/stats".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "" => continue,
                    "/quit" | "/exit" => break,
                    "/lead" => {
                        print_lead_profile(&orchestrator).await;
                        continue;
                    }
                    "/stats" => {
                        print_stats(&orchestrator).await;
                        continue;
                    }
                    _ => {}
                }
                let _ = rl.add_history_entry(&line);

                match run_turn(&orchestrator, trimmed.to_string()).await {
                    Ok(TurnOutcome::Completed { tier, provider, .. }) => {
                        let source = provider.unwrap_or_else(|| tier.to_string());
                        println!("{}", format!("[{tier} via {source}]").dimmed());
                        print_lead_line(&orchestrator).await;
                    }
                    Ok(TurnOutcome::Cancelled) => println!("{}", "(cancelled)".dimmed()),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
                if let Some(notice) = orchestrator.state().error {
                    eprintln!("{}", notice.yellow());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Sends one message, echoing the reply as it streams.
async fn run_turn(
    orchestrator: &Arc<Orchestrator>,
    input: String,
) -> Result<TurnOutcome, LeadwiseError> {
    let mut rx = orchestrator.subscribe();
    let mut echo = ReplyEcho::new(orchestrator.state().messages.len() + 1);

    let worker = orchestrator.clone();
    let mut turn = tokio::spawn(async move { worker.send_message(&input).await });

    let outcome = loop {
        tokio::select! {
            joined = &mut turn => {
                break joined
                    .map_err(|e| LeadwiseError::Internal(format!("chat turn task failed: {e}")))?;
            }
            Ok(()) = rx.changed() => {
                echo.update(&rx.borrow_and_update());
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("cancelling reply");
                orchestrator.cancel();
            }
        }
    };
    echo.update(&orchestrator.state());
    if echo.started() {
        println!();
    }
    outcome
}

/// Prints the growing assistant message without repeating text.
struct ReplyEcho {
    index: usize,
    printed: String,
}

impl ReplyEcho {
    fn new(index: usize) -> Self {
        Self {
            index,
            printed: String::new(),
        }
    }

    fn started(&self) -> bool {
        !self.printed.is_empty()
    }

    fn update(&mut self, state: &ChatState) {
        let Some(message) = state.messages.get(self.index) else {
            return;
        };
        let content = message.content.as_str();
        let mut out = std::io::stdout();
        if let Some(rest) = content.strip_prefix(self.printed.as_str()) {
            if rest.is_empty() {
                return;
            }
            if !self.started() {
                let _ = write!(out, "{} ", "assistant>".cyan());
            }
            let _ = write!(out, "{rest}");
        } else {
            // The reply was restarted on another tier.
            let _ = write!(out, "\n{} {content}", "assistant>".cyan());
        }
        let _ = out.flush();
        self.printed = content.to_string();
    }
}

async fn print_lead_line(orchestrator: &Orchestrator) {
    match orchestrator.lead().await {
        Ok(Some(lead)) => {
            let level = match lead.level {
                LeadLevel::Hot => lead.level.to_string().red().bold(),
                LeadLevel::Warm => lead.level.to_string().yellow(),
                LeadLevel::Cold => lead.level.to_string().blue(),
            };
            println!("{}", format!("lead score {:.1}/10 ({level})", lead.score).dimmed());
        }
        Ok(None) => {}
        Err(e) => debug!(error = %e, "lead unavailable"),
    }
}

async fn print_lead_profile(orchestrator: &Orchestrator) {
    match orchestrator.lead().await {
        Ok(Some(lead)) => match serde_json::to_string_pretty(&lead) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{}: {e}", "error".red()),
        },
        Ok(None) => println!("{}", "no lead profile yet".dimmed()),
        Err(e) => eprintln!("{}: {e}", "error".red()),
    }
}

async fn print_stats(orchestrator: &Orchestrator) {
    match orchestrator.analytics().snapshot(orchestrator.session()).await {
        Ok(snapshot) => match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{}: {e}", "error".red()),
        },
        Err(e) => eprintln!("{}: {e}", "error".red()),
    }
}
