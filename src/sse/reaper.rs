// ABOUTME: Delayed garbage collection of session state after a status subscription ends
// ABOUTME: Deletes the status mapping and result list once the grace window has elapsed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::scheduler::DelayedTask;
use crate::logging::AppLogger;
use crate::store::SessionStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Schedules deletion of a session's state one grace window after handoff
///
/// A reconnect inside the window still sees the session; the deletion is not
/// postponed by it.
#[derive(Clone)]
pub struct SessionReaper {
    store: SessionStore,
    delay: Duration,
    shutdown: CancellationToken,
    pending: Arc<AtomicUsize>,
}

struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionReaper {
    /// Creates a reaper deleting from `store` after `delay`
    #[must_use]
    pub fn new(store: SessionStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            shutdown: CancellationToken::new(),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Schedule deletion of `session_id`
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, session_id: &str) -> DelayedTask {
        self.pending.fetch_add(1, Ordering::SeqCst);
        let guard = PendingGuard(self.pending.clone());
        let store = self.store.clone();
        let session_id = session_id.to_owned();

        tracing::debug!(
            session.id = %session_id,
            delay_ms = %self.delay.as_millis(),
            "Session reap scheduled"
        );

        DelayedTask::spawn(self.delay, self.shutdown.child_token(), move || {
            let _guard = guard;
            let removed = store.delete_session(&session_id);
            AppLogger::log_session_reaped(&session_id, removed);
        })
    }

    /// Reaps scheduled but not yet fired or cancelled
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Grace window
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel every pending reap, leaving session state in place
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
