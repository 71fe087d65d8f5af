// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Leadwise.
//!
//! Exposes the provider fallback chain as a streaming chat endpoint, a
//! health signal for client-side routing, and an operator analytics report.

pub mod handlers;
pub mod server;

pub use handlers::{ChatRequest, ErrorResponse, parse_chat_request};
pub use server::{GatewayState, router, serve};
