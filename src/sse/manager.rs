// ABOUTME: Registry of active status subscriptions with per-connection metadata
// ABOUTME: Bookkeeping for monitoring and logging; it never routes or fans out events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Metadata of one open status subscription
#[derive(Debug, Clone)]
pub struct ConnectionMetadata {
    /// Session being observed
    pub session_id: String,
    /// When the subscription opened
    pub created_at: DateTime<Utc>,
}

/// Tracks open subscriptions by connection id
#[derive(Clone, Default)]
pub struct SubscriptionManager {
    connections: Arc<DashMap<Uuid, ConnectionMetadata>>,
}

impl SubscriptionManager {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscription for `session_id` and return its connection id
    pub fn register(&self, session_id: &str) -> Uuid {
        let connection_id = Uuid::new_v4();
        let metadata = ConnectionMetadata {
            session_id: session_id.to_owned(),
            created_at: Utc::now(),
        };

        let concurrent = self.subscriptions_for_session(session_id);
        if concurrent > 0 {
            // Each subscriber polls on its own; nothing coordinates them
            tracing::warn!(
                session.id = %session_id,
                existing = concurrent,
                "Additional subscriber for session"
            );
        }

        self.connections.insert(connection_id, metadata);
        tracing::info!(
            "Registered status subscription {} for session: {}",
            connection_id,
            session_id
        );
        connection_id
    }

    /// Remove a subscription, returning its metadata if it was registered
    pub fn unregister(&self, connection_id: &Uuid) -> Option<ConnectionMetadata> {
        let removed = self
            .connections
            .remove(connection_id)
            .map(|(_, metadata)| metadata);

        if let Some(metadata) = &removed {
            tracing::info!(
                "Unregistered status subscription {} for session: {}",
                connection_id,
                metadata.session_id
            );
        }
        removed
    }

    /// Number of open subscriptions
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.connections.len()
    }

    /// Number of open subscriptions observing `session_id`
    #[must_use]
    pub fn subscriptions_for_session(&self, session_id: &str) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.value().session_id == session_id)
            .count()
    }

    /// Copy of all connection metadata for monitoring
    #[must_use]
    pub fn get_connection_metadata(&self) -> HashMap<Uuid, ConnectionMetadata> {
        self.connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let manager = SubscriptionManager::new();
        let first = manager.register("abc");
        let second = manager.register("abc");
        let other = manager.register("def");

        assert_ne!(first, second);
        assert_eq!(manager.active_subscriptions(), 3);
        assert_eq!(manager.subscriptions_for_session("abc"), 2);

        let removed = manager.unregister(&first).unwrap();
        assert_eq!(removed.session_id, "abc");
        assert!(manager.unregister(&first).is_none());

        let metadata = manager.get_connection_metadata();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[&other].session_id, "def");
    }
}
