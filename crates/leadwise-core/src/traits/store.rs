// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-partitioned repository interface.

use async_trait::async_trait;

use crate::error::LeadwiseError;
use crate::types::SessionId;

/// Keyed storage for one kind of per-session record.
///
/// Every mutable piece of conversation state is partitioned by session, so
/// implementations never need cross-session locking. The default backing is
/// [`InMemoryStore`](crate::store::InMemoryStore); state lives only as long
/// as the process.
#[async_trait]
pub trait SessionStore<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Returns the record for `session`, if any.
    async fn get(&self, session: &SessionId) -> Result<Option<T>, LeadwiseError>;

    /// Inserts or replaces the record for `session`.
    async fn put(&self, session: &SessionId, value: T) -> Result<(), LeadwiseError>;

    /// Lists every session that has a record.
    async fn sessions(&self) -> Result<Vec<SessionId>, LeadwiseError>;
}
