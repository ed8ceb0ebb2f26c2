// ABOUTME: Shared server resources constructed once at startup and injected into routes
// ABOUTME: Bundles the session store, relay configuration, reaper and subscription registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::ServerConfig;
use crate::sse::{reaper::SessionReaper, SubscriptionManager};
use crate::store::SessionStore;
use std::sync::Arc;

/// Dependencies shared by every status subscription
///
/// The store handed in here is the same instance the analysis producer writes to.
pub struct ServerResources {
    /// Session status and result state
    pub store: SessionStore,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Delayed cleanup of disconnected sessions
    pub reaper: SessionReaper,
    /// Registry of open subscriptions
    pub subscriptions: SubscriptionManager,
}

impl ServerResources {
    /// Wire resources around an existing store
    #[must_use]
    pub fn new(store: SessionStore, config: Arc<ServerConfig>) -> Self {
        let reaper = SessionReaper::new(store.clone(), config.relay.reap_delay());
        Self {
            store,
            config,
            reaper,
            subscriptions: SubscriptionManager::new(),
        }
    }

    /// Stop pending background work ahead of process exit
    pub fn shutdown(&self) {
        tracing::info!(
            pending_reaps = self.reaper.pending(),
            active_subscriptions = self.subscriptions.active_subscriptions(),
            "Shutting down relay resources"
        );
        self.reaper.shutdown();
    }
}
