// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadwise sales assistant.

use thiserror::Error;

/// The primary error type used across Leadwise crates.
#[derive(Debug, Error)]
pub enum LeadwiseError {
    /// Configuration errors (invalid TOML, bad URLs, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote or local inference provider errors.
    ///
    /// `retryable` marks transient failures (timeouts, 5xx, 429, dropped
    /// connections) that the fallback chain may retry.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        retryable: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No remote provider is configured. Callers degrade to local or rules.
    #[error("no remote provider configured")]
    NoProviderConfigured,

    /// Malformed input rejected before any work is attempted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A message is already being sent for this session.
    #[error("a message is already in flight for this session")]
    Busy,

    /// The in-flight operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// Session store errors.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadwiseError {
    /// Builds a retryable provider error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            retryable: true,
            source: None,
        }
    }

    /// Builds a non-retryable provider error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            retryable: false,
            source: None,
        }
    }

    /// Returns true when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
