// src/session/registry.rs
// Session table: allocates identifiers and tracks open documents

use super::{DocumentHandle, DocumentKind, Session, SessionId};
use crate::error::{OfficeError, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    /// Next counter value to hand out. Only ever increases.
    next_id: u64,
    sessions: BTreeMap<SessionId, Session>,
}

/// Maps session identifiers to open documents.
///
/// The id counter and the table sit behind one mutex so allocation, lookup and
/// removal are serialized. The lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        // The table stays consistent even if a holder panicked: every mutation
        // is a single insert/remove.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a freshly opened document and return its new identifier.
    pub fn allocate(&self, handle: DocumentHandle, kind: DocumentKind) -> SessionId {
        let mut inner = self.inner();
        let id = SessionId::from_counter(inner.next_id);
        inner.next_id += 1;
        inner.sessions.insert(
            id,
            Session {
                id,
                handle,
                kind,
                created_at: Utc::now(),
            },
        );
        debug!(session = %id, kind = %kind, "Allocated session");
        id
    }

    pub fn lookup(&self, id: SessionId) -> Result<Session> {
        self.inner()
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| OfficeError::SessionNotFound(id.to_string()))
    }

    /// Resolve a textual identifier such as `doc_3`.
    pub fn lookup_str(&self, id: &str) -> Result<Session> {
        self.lookup(id.parse()?)
    }

    /// Remove a session. Removing an id twice is an error so double-close is visible.
    pub fn remove(&self, id: SessionId) -> Result<Session> {
        let removed = self
            .inner()
            .sessions
            .remove(&id)
            .ok_or_else(|| OfficeError::SessionNotFound(id.to_string()))?;
        debug!(session = %id, "Removed session");
        Ok(removed)
    }

    /// Remove and return every session in id order. Used at shutdown.
    pub fn drain_all(&self) -> Vec<Session> {
        let sessions = std::mem::take(&mut self.inner().sessions);
        sessions.into_values().collect()
    }

    /// Snapshot of live sessions in id order
    pub fn list(&self) -> Vec<Session> {
        self.inner().sessions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner().sessions.is_empty()
    }
}
