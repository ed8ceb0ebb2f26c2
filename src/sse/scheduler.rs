// ABOUTME: Cancellable periodic and delayed tasks backing subscription timers and session reaping
// ABOUTME: Each task is bound to a CancellationToken so one cancel call stops every timer sharing it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// When the first tick of a [`PeriodicTask`] fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTick {
    /// Right away
    Immediate,
    /// One period after spawning
    AfterPeriod,
}

/// Runs a callback on a fixed period until it breaks or its token is cancelled
///
/// Dropping the handle detaches the task; only the token stops it.
#[derive(Debug)]
pub struct PeriodicTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn on the current tokio runtime
    pub fn spawn<F>(
        period: Duration,
        first_tick: FirstTick,
        token: CancellationToken,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let start = match first_tick {
                FirstTick::Immediate => Instant::now(),
                FirstTick::AfterPeriod => Instant::now() + period,
            };
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        if tick().is_break() {
                            break;
                        }
                    }
                }
            }
        });

        Self { token, handle }
    }

    /// Stop the task and every other task sharing its token
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the task loop has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task loop to exit
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Periodic task ended abnormally");
        }
    }
}

/// Runs a callback once after a delay unless its token is cancelled first
#[derive(Debug)]
pub struct DelayedTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl DelayedTask {
    /// Spawn on the current tokio runtime
    ///
    /// `action` is dropped without running if the token is cancelled before
    /// the delay elapses.
    pub fn spawn<F>(delay: Duration, token: CancellationToken, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = task_token.cancelled() => {}
                () = time::sleep(delay) => action(),
            }
        });

        Self { token, handle }
    }

    /// Abort the pending action
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the action ran or was cancelled
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the action ran or was cancelled
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Delayed task ended abnormally");
        }
    }
}
