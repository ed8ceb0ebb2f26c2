// ABOUTME: System-wide constants and default configuration values for the status relay
// ABOUTME: Timer defaults, wire strings, route paths and service identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded defaults; most of them can be overridden through the
//! environment-driven configuration in [`crate::config`].

/// Service identification
pub mod service_names {
    /// Name reported in logs and health responses
    pub const STATUS_RELAY: &str = "status-relay";
}

/// Stream driver and reaper timing defaults, in milliseconds
pub mod timeouts {
    /// Interval between two store polls of one subscription
    pub const POLL_INTERVAL_MS: u64 = 500;
    /// Interval between two keepalive comment frames
    pub const KEEPALIVE_INTERVAL_MS: u64 = 30_000;
    /// Grace window between disconnect and deletion of session state
    pub const REAP_DELAY_MS: u64 = 300_000;
}

/// Network and transport defaults
pub mod network_config {
    /// Default HTTP listen port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
    /// Frames buffered per subscription before new frames are dropped
    pub const SSE_CHANNEL_CAPACITY: usize = 64;
}

/// Strings that appear on the wire
pub mod wire {
    /// Query parameter carrying the session id
    pub const SESSION_ID_PARAM: &str = "sessionId";
    /// Fallback `lastMessage` of a completed item with neither status message nor error
    pub const DEFAULT_COMPLETE_MESSAGE: &str = "Analysis complete";
    /// Text of keepalive comment frames
    pub const KEEPALIVE_COMMENT: &str = "keepalive";
    /// Suffix marking producer-specific completion tags
    pub const COMPLETE_VARIANT_SUFFIX: &str = "_COMPLETE";
}

/// HTTP route paths
pub mod routes {
    /// Status stream endpoint
    pub const ANALYZE_COMPLETE_STATUS: &str = "/api/wayback/analyze-complete-status";
    /// Liveness endpoint
    pub const HEALTH: &str = "/health";
}
