// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging setup, relay resources and frame decoding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
//! Shared test utilities for `status_relay`

use serde_json::Value;
use status_relay::{
    config::ServerConfig,
    models::{ItemStatus, StatusRecord},
    resources::ServerResources,
    sse::Frame,
    store::SessionStore,
};
use std::sync::{Arc, Once};
use tokio::sync::mpsc;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Resources over an empty store with default timers
pub fn create_test_resources() -> Arc<ServerResources> {
    create_test_resources_with(ServerConfig::default())
}

/// Resources over an empty store with a custom configuration
pub fn create_test_resources_with(config: ServerConfig) -> Arc<ServerResources> {
    init_test_logging();
    Arc::new(ServerResources::new(SessionStore::new(), Arc::new(config)))
}

/// Write a status record the way the analysis producer does
pub fn seed_status(store: &SessionStore, session_id: &str, domain: &str, status: ItemStatus) {
    store
        .set_status(session_id, domain, StatusRecord::new(domain, status))
        .expect("Failed to seed status");
}

/// Receive the next JSON event, skipping keepalive comments
pub async fn next_event(receiver: &mut mpsc::Receiver<Frame>) -> Value {
    loop {
        match receiver.recv().await {
            Some(Frame::Data(json)) => {
                return serde_json::from_str(&json).expect("Frame is not valid JSON")
            }
            Some(Frame::Comment(_)) => {}
            None => panic!("Stream closed before the next event"),
        }
    }
}

/// Drain the channel until it closes, returning every frame
pub async fn drain(receiver: &mut mpsc::Receiver<Frame>) -> Vec<Frame> {
    let mut frames = Vec::new();
    while let Some(frame) = receiver.recv().await {
        frames.push(frame);
    }
    frames
}
