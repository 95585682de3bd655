// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue sessions and where they live between events.
//!
//! A session exists only while a user is inside a flow. Sessions never
//! expire; they end on confirmation, cancellation, or a short circuit.

use async_trait::async_trait;
use dashmap::DashMap;
use vyvoz_core::{UserId, VyvozError};

use crate::draft::Draft;
use crate::flow::{Flow, Step};

/// The in-progress state of one user's dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSession {
    pub step: Step,
    pub draft: Draft,
}

impl DialogueSession {
    /// A fresh session at the flow's first step.
    pub fn start(flow: Flow) -> Self {
        Self {
            step: flow.first_step(),
            draft: Draft::new(flow),
        }
    }

    pub fn flow(&self) -> Flow {
        self.draft.flow()
    }
}

/// Storage for dialogue sessions, keyed by user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user: UserId) -> Result<Option<DialogueSession>, VyvozError>;

    /// Creates or overwrites the user's session.
    async fn put(&self, user: UserId, session: DialogueSession) -> Result<(), VyvozError>;

    /// Removes the user's session, returning whether one existed.
    async fn delete(&self, user: UserId) -> Result<bool, VyvozError>;
}

/// Process-memory session store. Sharded per key, no cross-user lock.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<UserId, DialogueSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users currently inside a dialogue.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, user: UserId) -> Result<Option<DialogueSession>, VyvozError> {
        Ok(self.sessions.get(&user).map(|entry| entry.value().clone()))
    }

    async fn put(&self, user: UserId, session: DialogueSession) -> Result<(), VyvozError> {
        self.sessions.insert(user, session);
        Ok(())
    }

    async fn delete(&self, user: UserId) -> Result<bool, VyvozError> {
        Ok(self.sessions.remove(&user).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get(UserId(1)).await.unwrap(), None);

        store
            .put(UserId(1), DialogueSession::start(Flow::Pickup))
            .await
            .unwrap();
        let session = store.get(UserId(1)).await.unwrap().unwrap();
        assert_eq!(session.step, Step::FullName);
        assert_eq!(session.flow(), Flow::Pickup);

        assert!(store.delete(UserId(1)).await.unwrap());
        assert!(!store.delete(UserId(1)).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn put_overwrites_existing_session() {
        let store = MemorySessionStore::new();
        store
            .put(UserId(1), DialogueSession::start(Flow::Pickup))
            .await
            .unwrap();
        store
            .put(UserId(1), DialogueSession::start(Flow::Complaint))
            .await
            .unwrap();
        let session = store.get(UserId(1)).await.unwrap().unwrap();
        assert_eq!(session.step, Step::Category);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn users_are_isolated_under_concurrency() {
        let store = Arc::new(MemorySessionStore::new());
        let mut handles = Vec::new();
        for id in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let flow = if id % 2 == 0 { Flow::Pickup } else { Flow::Complaint };
                store.put(UserId(id), DialogueSession::start(flow)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len(), 32);
        let odd = store.get(UserId(3)).await.unwrap().unwrap();
        assert_eq!(odd.flow(), Flow::Complaint);
    }
}
