// ABOUTME: Stream driver, keepalive and reaper configuration for status subscriptions
// ABOUTME: Loads timer periods, channel capacity and completion policy from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::{network_config, timeouts};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which status tags count as terminal when deciding completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatusPolicy {
    /// Only `COMPLETE`, `UNAVAILABLE` and `NO_SNAPSHOTS`
    #[default]
    Strict,
    /// Additionally accept producer tags ending in `_COMPLETE`
    CompleteVariants,
}

/// Status subscription configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Store poll period in milliseconds
    pub poll_interval_ms: u64,
    /// Keepalive comment period in milliseconds
    pub keepalive_interval_ms: u64,
    /// Grace window before a disconnected session is deleted, in milliseconds
    pub reap_delay_ms: u64,
    /// Frames buffered per subscription
    pub channel_capacity: usize,
    /// Terminal status classification
    pub terminal_status_policy: TerminalStatusPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: timeouts::POLL_INTERVAL_MS,
            keepalive_interval_ms: timeouts::KEEPALIVE_INTERVAL_MS,
            reap_delay_ms: timeouts::REAP_DELAY_MS,
            channel_capacity: network_config::SSE_CHANNEL_CAPACITY,
            terminal_status_policy: TerminalStatusPolicy::default(),
        }
    }
}

impl RelayConfig {
    /// Load relay configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a relay environment variable cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        let accept_variants: bool = parse_env("RELAY_ACCEPT_COMPLETE_VARIANTS", false)?;

        let config = Self {
            poll_interval_ms: parse_env("RELAY_POLL_INTERVAL_MS", timeouts::POLL_INTERVAL_MS)?,
            keepalive_interval_ms: parse_env(
                "RELAY_KEEPALIVE_INTERVAL_MS",
                timeouts::KEEPALIVE_INTERVAL_MS,
            )?,
            reap_delay_ms: parse_env("RELAY_REAP_DELAY_MS", timeouts::REAP_DELAY_MS)?,
            channel_capacity: parse_env(
                "RELAY_CHANNEL_CAPACITY",
                network_config::SSE_CHANNEL_CAPACITY,
            )?,
            terminal_status_policy: if accept_variants {
                TerminalStatusPolicy::CompleteVariants
            } else {
                TerminalStatusPolicy::Strict
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the timers and channel cannot work with
    ///
    /// # Errors
    ///
    /// Returns an error if an interval or the channel capacity is zero
    pub fn validate(&self) -> AppResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(AppError::config("RELAY_POLL_INTERVAL_MS must be positive"));
        }
        if self.keepalive_interval_ms == 0 {
            return Err(AppError::config(
                "RELAY_KEEPALIVE_INTERVAL_MS must be positive",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(AppError::config("RELAY_CHANNEL_CAPACITY must be positive"));
        }
        Ok(())
    }

    /// Store poll period
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Keepalive period
    #[must_use]
    pub const fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }

    /// Reaper grace window
    #[must_use]
    pub const fn reap_delay(&self) -> Duration {
        Duration::from_millis(self.reap_delay_ms)
    }
}

fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::invalid_input(format!("Invalid {key} value: {e}"))),
        Err(_) => Ok(default),
    }
}
