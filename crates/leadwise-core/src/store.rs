// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local [`SessionStore`] backed by a sharded concurrent map.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::LeadwiseError;
use crate::traits::SessionStore;
use crate::types::SessionId;

/// In-memory store. Contents are lost when the process exits.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    entries: DashMap<SessionId, T>,
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of sessions with a record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> SessionStore<T> for InMemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, session: &SessionId) -> Result<Option<T>, LeadwiseError> {
        Ok(self.entries.get(session).map(|entry| entry.value().clone()))
    }

    async fn put(&self, session: &SessionId, value: T) -> Result<(), LeadwiseError> {
        self.entries.insert(session.clone(), value);
        Ok(())
    }

    async fn sessions(&self) -> Result<Vec<SessionId>, LeadwiseError> {
        let mut ids: Vec<SessionId> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}
