// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference backends for Leadwise.
//!
//! Every backend implements [`TextGenerator`](leadwise_core::TextGenerator)
//! and hides its wire format: OpenAI-compatible SSE for groq, together and
//! openai, Anthropic Messages SSE, and Ollama NDJSON for the local tier.
//! [`ProviderChain`] tries configured remote providers in fixed priority
//! with bounded retry and a single secondary attempt.

pub mod anthropic;
pub mod chain;
mod frames;
pub mod http;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod provider;

pub use anthropic::AnthropicGenerator;
pub use chain::{ChainStream, ProviderChain, RetryPolicy, register_metrics};
pub use http::is_transient_status;
pub use ollama::OllamaGenerator;
pub use openai::OpenAiCompatibleGenerator;
pub use prompt::{PreparedPrompt, PromptBuilder, cap_history};
pub use provider::{ProviderId, WireFormat};
