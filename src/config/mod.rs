// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-driven server, logging level and relay timer configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module for the status relay
//!
//! - **Environment**: Server configuration from environment variables
//! - **Relay**: Poll, keepalive and reaper timing plus the completion policy

/// Environment and server configuration
pub mod environment;
/// Status subscription timing and completion policy
pub mod relay;

pub use environment::{LogLevel, ServerConfig};
pub use relay::{RelayConfig, TerminalStatusPolicy};
