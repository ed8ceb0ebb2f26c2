// ABOUTME: Server-Sent Events relay of session analysis progress to a single subscriber
// ABOUTME: Completion detection, snapshot building, stream driving, scheduling and delayed cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Completion predicate over item statuses and results
pub mod completion;
/// Per-subscription poll/keepalive loop and lifecycle
pub mod driver;
/// Registry of open subscriptions for monitoring
pub mod manager;
/// Delayed deletion of session state after a subscription ends
pub mod reaper;
/// HTTP route handlers for the status stream
pub mod routes;
/// Cancellable periodic and delayed tasks
pub mod scheduler;
/// Stream events derived from session state
pub mod snapshot;

pub use driver::{
    EventEncoder, Frame, StreamDriver, SubscriptionHandle, SubscriptionState, TerminationReason,
};
pub use manager::{ConnectionMetadata, SubscriptionManager};
pub use reaper::SessionReaper;
pub use routes::SseRoutes;
pub use snapshot::{CompletedItem, SnapshotBuilder, StreamEvent};
