// ABOUTME: Per-subscription stream driver polling the session store and pushing status frames
// ABOUTME: Owns the poll and keepalive timers, detects completion and disconnect, hands off to the reaper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Stream Driver
//!
//! One driver runs per open subscription:
//!
//! 1. `CONNECTED`: the `connected` frame is queued as soon as the subscription opens.
//! 2. `STREAMING`: a poll timer reads the store and pushes `update`, `error` or
//!    the final `complete` frame, while a slower keepalive timer pushes comment frames.
//! 3. `TERMINATED`: reached once, on delivered completion or on disconnect.
//!    Both timers share one cancellation token, the outbound channel is dropped
//!    and the session is handed to the reaper.
//!
//! Frames go through a bounded channel with `try_send`; a full buffer drops
//! the frame and a closed channel counts as a disconnect.

use super::manager::SubscriptionManager;
use super::reaper::SessionReaper;
use super::scheduler::{FirstTick, PeriodicTask};
use super::snapshot::{SnapshotBuilder, StreamEvent};
use crate::config::RelayConfig;
use crate::constants::wire::KEEPALIVE_COMMENT;
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::store::SessionStore;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Used when even the error event cannot be serialized
const FALLBACK_ERROR_FRAME: &str = r#"{"type":"error","message":"Failed to encode status snapshot"}"#;

/// Serializes a stream event into a `data` frame payload
pub type EventEncoder = Arc<dyn Fn(&StreamEvent) -> AppResult<String> + Send + Sync>;

/// One unit written to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// JSON event payload
    Data(String),
    /// Comment line, ignored by clients
    Comment(&'static str),
}

/// Why a subscription ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The `complete` event was delivered
    Completed,
    /// The client went away
    Disconnected,
}

impl TerminationReason {
    /// Log label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Lifecycle of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Opened, `connected` not yet queued
    Connected,
    /// Timers running
    Streaming,
    /// Final; timers cancelled
    Terminated(TerminationReason),
}

enum Delivery {
    Sent,
    Dropped,
    Closed,
}

struct Subscription {
    session_id: String,
    connection_id: Uuid,
    opened_at: Instant,
    store: SessionStore,
    builder: SnapshotBuilder,
    encoder: EventEncoder,
    reaper: SessionReaper,
    subscriptions: SubscriptionManager,
    sender: Mutex<Option<mpsc::Sender<Frame>>>,
    state: Mutex<SubscriptionState>,
    cancel: CancellationToken,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Subscription {
    fn state(&self) -> SubscriptionState {
        *lock(&self.state)
    }

    fn is_streaming(&self) -> bool {
        self.state() == SubscriptionState::Streaming
    }

    fn deliver(&self, frame: Frame) -> Delivery {
        let outcome = {
            let sender = lock(&self.sender);
            match sender.as_ref() {
                None => return Delivery::Closed,
                Some(sender) if sender.is_closed() => Delivery::Closed,
                Some(sender) => match sender.try_send(frame) {
                    Ok(()) => Delivery::Sent,
                    Err(TrySendError::Full(_)) => Delivery::Dropped,
                    Err(TrySendError::Closed(_)) => Delivery::Closed,
                },
            }
        };

        match outcome {
            Delivery::Closed => {
                self.terminate(TerminationReason::Disconnected);
            }
            Delivery::Dropped => {
                tracing::debug!(
                    session.id = %self.session_id,
                    connection.id = %self.connection_id,
                    "Subscriber buffer full, frame dropped"
                );
            }
            Delivery::Sent => {}
        }
        outcome
    }

    fn poll_tick(&self) -> ControlFlow<()> {
        if !self.is_streaming() {
            return ControlFlow::Break(());
        }

        let snapshot = self.store.snapshot(&self.session_id);
        let Some(event) = self.builder.next_event(&snapshot) else {
            return ControlFlow::Continue(());
        };

        let completes = event.is_terminal();
        let frame = match (self.encoder)(&event) {
            Ok(json) => json,
            Err(fault) => {
                tracing::warn!(
                    session.id = %self.session_id,
                    event = event.kind(),
                    error = %fault,
                    "Failed to build status snapshot"
                );
                let error_frame = StreamEvent::error(fault.message)
                    .encode()
                    .unwrap_or_else(|_| FALLBACK_ERROR_FRAME.to_owned());
                return match self.deliver(Frame::Data(error_frame)) {
                    Delivery::Closed => ControlFlow::Break(()),
                    Delivery::Sent | Delivery::Dropped => ControlFlow::Continue(()),
                };
            }
        };

        match self.deliver(Frame::Data(frame)) {
            Delivery::Closed => ControlFlow::Break(()),
            // a dropped `complete` is retried on the next tick; results stay put
            Delivery::Dropped => ControlFlow::Continue(()),
            Delivery::Sent if completes => {
                self.store.delete_results(&self.session_id);
                self.terminate(TerminationReason::Completed);
                ControlFlow::Break(())
            }
            Delivery::Sent => ControlFlow::Continue(()),
        }
    }

    fn keepalive_tick(&self) -> ControlFlow<()> {
        if !self.is_streaming() {
            return ControlFlow::Break(());
        }
        match self.deliver(Frame::Comment(KEEPALIVE_COMMENT)) {
            Delivery::Closed => ControlFlow::Break(()),
            Delivery::Sent | Delivery::Dropped => ControlFlow::Continue(()),
        }
    }

    /// Returns `false` if the subscription had already terminated
    fn terminate(&self, reason: TerminationReason) -> bool {
        {
            let mut state = lock(&self.state);
            if matches!(*state, SubscriptionState::Terminated(_)) {
                return false;
            }
            *state = SubscriptionState::Terminated(reason);
        }

        self.cancel.cancel();
        lock(&self.sender).take();
        self.subscriptions.unregister(&self.connection_id);
        drop(self.reaper.schedule(&self.session_id));

        AppLogger::log_subscription_closed(
            &self.session_id,
            &self.connection_id.to_string(),
            reason.as_str(),
            u64::try_from(self.opened_at.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        true
    }
}

/// Handle to a running subscription
#[derive(Clone)]
pub struct SubscriptionHandle {
    inner: Arc<Subscription>,
}

impl SubscriptionHandle {
    /// Session being observed
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Registry id of this subscription
    #[must_use]
    pub fn connection_id(&self) -> Uuid {
        self.inner.connection_id
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        self.inner.state()
    }

    /// Signal a client disconnect
    ///
    /// Only the first termination, whether by completion or disconnect,
    /// cancels the timers and schedules the reaper. Returns whether this call
    /// terminated the subscription.
    pub fn disconnect(&self) -> bool {
        self.inner.terminate(TerminationReason::Disconnected)
    }

    /// Resolves once the subscription has terminated
    pub async fn terminated(&self) {
        self.inner.cancel.cancelled().await;
    }
}

/// Opens status subscriptions
pub struct StreamDriver;

impl StreamDriver {
    /// Open a subscription for `session_id` using shared server resources
    ///
    /// Must be called from within a tokio runtime. The returned receiver is
    /// the transport side: dropping it is the disconnect signal.
    #[must_use]
    pub fn open(
        resources: &ServerResources,
        session_id: &str,
    ) -> (SubscriptionHandle, mpsc::Receiver<Frame>) {
        Self::open_with(
            &resources.config.relay,
            resources.store.clone(),
            resources.reaper.clone(),
            resources.subscriptions.clone(),
            session_id,
        )
    }

    /// Open a subscription from individual collaborators
    #[must_use]
    pub fn open_with(
        config: &RelayConfig,
        store: SessionStore,
        reaper: SessionReaper,
        subscriptions: SubscriptionManager,
        session_id: &str,
    ) -> (SubscriptionHandle, mpsc::Receiver<Frame>) {
        Self::open_with_encoder(
            config,
            store,
            reaper,
            subscriptions,
            session_id,
            Arc::new(StreamEvent::encode),
        )
    }

    /// Open a subscription whose polled events go through `encoder`
    ///
    /// An encoder failure is reported to the client as an `error` event and
    /// polling carries on.
    #[must_use]
    pub fn open_with_encoder(
        config: &RelayConfig,
        store: SessionStore,
        reaper: SessionReaper,
        subscriptions: SubscriptionManager,
        session_id: &str,
        encoder: EventEncoder,
    ) -> (SubscriptionHandle, mpsc::Receiver<Frame>) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let connection_id = subscriptions.register(session_id);
        AppLogger::log_subscription_opened(session_id, &connection_id.to_string());

        let subscription = Arc::new(Subscription {
            session_id: session_id.to_owned(),
            connection_id,
            opened_at: Instant::now(),
            store,
            builder: SnapshotBuilder::new(config.terminal_status_policy),
            encoder,
            reaper,
            subscriptions,
            sender: Mutex::new(Some(sender.clone())),
            state: Mutex::new(SubscriptionState::Connected),
            cancel: CancellationToken::new(),
        });

        let connected = StreamEvent::connected(session_id)
            .encode()
            .unwrap_or_else(|_| FALLBACK_ERROR_FRAME.to_owned());
        if let Delivery::Closed = subscription.deliver(Frame::Data(connected)) {
            return (SubscriptionHandle { inner: subscription }, receiver);
        }
        *lock(&subscription.state) = SubscriptionState::Streaming;

        let poller = subscription.clone();
        PeriodicTask::spawn(
            config.poll_interval(),
            FirstTick::Immediate,
            subscription.cancel.clone(),
            move || poller.poll_tick(),
        );

        let keeper = subscription.clone();
        PeriodicTask::spawn(
            config.keepalive_interval(),
            FirstTick::AfterPeriod,
            subscription.cancel.clone(),
            move || keeper.keepalive_tick(),
        );

        let watcher = subscription.clone();
        let cancel = subscription.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = sender.closed() => {
                    watcher.terminate(TerminationReason::Disconnected);
                }
            }
        });

        (SubscriptionHandle { inner: subscription }, receiver)
    }
}
