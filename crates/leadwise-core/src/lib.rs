// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadwise sales assistant.
//!
//! This crate provides the shared data model (sessions, turns, insights,
//! business and lead profiles), the [`TextGenerator`] capability every
//! inference backend implements, the [`SessionStore`] repository interface,
//! and the [`LeadwiseError`] type used throughout the workspace.

pub mod error;
pub mod protocol;
pub mod store;
pub mod traits;
pub mod types;

pub use error::LeadwiseError;
pub use protocol::{FALLBACK_PROVIDER, PROVIDER_HEADER, SESSION_HEADER};
pub use store::InMemoryStore;
pub use traits::{SessionStore, TextGenerator, TextStream};
pub use types::{
    Budget, BudgetBand, BusinessProfile, ChatMessage, ConversationTurn, FactorBreakdown, Insight,
    InsightType, Intent, LeadLevel, LeadProfile, Priority, Role, Sentiment, Session, SessionId,
    Tier, Timeline, TimelineBand,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_retryability() {
        assert!(LeadwiseError::transient("503").is_retryable());
        assert!(!LeadwiseError::permanent("401").is_retryable());
        assert!(
            LeadwiseError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_retryable()
        );
        assert!(!LeadwiseError::NoProviderConfigured.is_retryable());
        assert!(!LeadwiseError::Cancelled.is_retryable());
    }

    #[test]
    fn invalid_request_message_prefix() {
        let err = LeadwiseError::InvalidRequest("messages must not be empty".into());
        assert!(err.to_string().starts_with("Invalid request"));
    }
}
