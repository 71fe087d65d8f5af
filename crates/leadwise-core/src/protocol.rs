// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Header names shared by the chat gateway and its clients.

/// Header carrying the conversation id on requests and responses.
pub const SESSION_HEADER: &str = "x-session-id";

/// Header naming the provider that served the reply.
pub const PROVIDER_HEADER: &str = "x-ai-provider";

/// Provider header value telling the client to answer locally.
pub const FALLBACK_PROVIDER: &str = "fallback";
