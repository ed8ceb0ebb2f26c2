// ABOUTME: Session-keyed status and result store shared by the analysis producer and status streams
// ABOUTME: Sharded concurrent map whose per-entry lock serializes reads, producer writes and deletions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session Store
//!
//! Holds, per session id, the status mapping (item key to [`StatusRecord`]) and
//! the final result list. The producer writes both; status streams only read
//! snapshots, drop the result list after delivering it, and the reaper drops
//! whole sessions.
//!
//! Every operation takes the `DashMap` shard lock for its session, so a
//! snapshot always sees the status mapping and result list as of one instant
//! and never races a concurrent reap.

use crate::errors::{AppError, AppResult};
use dashmap::DashMap;
use relay_core::models::{ResultRecord, StatusRecord};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Status mapping of one session, ordered by item key
pub type StatusMap = BTreeMap<String, StatusRecord>;

#[derive(Debug, Default)]
struct SessionEntry {
    statuses: Option<StatusMap>,
    results: Option<Vec<ResultRecord>>,
}

impl SessionEntry {
    const fn is_empty(&self) -> bool {
        self.statuses.is_none() && self.results.is_none()
    }
}

/// Consistent read of one session's state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// Status mapping, absent until the producer writes the first status
    pub statuses: Option<StatusMap>,
    /// Result list, absent until the producer publishes results
    pub results: Option<Vec<ResultRecord>>,
}

/// Process-wide session state, created once at server start and shared by handle
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
}

impl SessionStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the status of one item (producer side)
    ///
    /// # Errors
    ///
    /// Returns an error if the session id or item key is empty
    pub fn set_status(
        &self,
        session_id: &str,
        item_key: &str,
        record: StatusRecord,
    ) -> AppResult<()> {
        ensure_non_empty("session id", session_id)?;
        ensure_non_empty("item key", item_key)?;

        self.sessions
            .entry(session_id.to_owned())
            .or_default()
            .statuses
            .get_or_insert_with(StatusMap::new)
            .insert(item_key.to_owned(), record);
        Ok(())
    }

    /// Publish the final result list, replacing any previous one (producer side)
    ///
    /// # Errors
    ///
    /// Returns an error if the session id is empty
    pub fn set_results(&self, session_id: &str, results: Vec<ResultRecord>) -> AppResult<()> {
        ensure_non_empty("session id", session_id)?;

        self.sessions.entry(session_id.to_owned()).or_default().results = Some(results);
        Ok(())
    }

    /// Copy of the session's status mapping
    #[must_use]
    pub fn get_status(&self, session_id: &str) -> Option<StatusMap> {
        self.sessions
            .get(session_id)
            .and_then(|entry| entry.statuses.clone())
    }

    /// Copy of the session's result list
    #[must_use]
    pub fn get_results(&self, session_id: &str) -> Option<Vec<ResultRecord>> {
        self.sessions
            .get(session_id)
            .and_then(|entry| entry.results.clone())
    }

    /// Read status mapping and result list under a single lock
    #[must_use]
    pub fn snapshot(&self, session_id: &str) -> SessionSnapshot {
        self.sessions
            .get(session_id)
            .map(|entry| SessionSnapshot {
                statuses: entry.statuses.clone(),
                results: entry.results.clone(),
            })
            .unwrap_or_default()
    }

    /// Drop the result list, keeping the status mapping
    ///
    /// Returns whether a result list was present.
    pub fn delete_results(&self, session_id: &str) -> bool {
        let removed = self
            .sessions
            .get_mut(session_id)
            .and_then(|mut entry| entry.results.take())
            .is_some();

        self.sessions
            .remove_if(session_id, |_, entry| entry.is_empty());
        removed
    }

    /// Drop all state of the session
    ///
    /// Returns whether anything was present.
    pub fn delete_session(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Whether the store holds any state for the session
    #[must_use]
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Number of sessions with state
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn ensure_non_empty(what: &str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::invalid_input(format!("{what} must not be empty")));
    }
    Ok(())
}
