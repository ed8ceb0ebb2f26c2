// ABOUTME: Environment-based server configuration for the status relay
// ABOUTME: Top-level ServerConfig combining HTTP listener, log level and relay settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use super::relay::{RelayConfig, TerminalStatusPolicy};
use crate::constants::network_config;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Default operational logging
    #[default]
    Info,
    /// Verbose diagnostics
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Status subscription settings
    pub relay: RelayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: network_config::DEFAULT_HTTP_PORT,
            log_level: LogLevel::default(),
            relay: RelayConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable holds an invalid value
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let http_port = match env::var("HTTP_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| AppError::invalid_input(format!("Invalid HTTP_PORT value: {e}")))?,
            Err(_) => network_config::DEFAULT_HTTP_PORT,
        };

        let config = Self {
            http_port,
            log_level: LogLevel::from_str_or_default(
                &env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned()),
            ),
            relay: RelayConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the combined configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a section is invalid
    pub fn validate(&self) -> AppResult<()> {
        if self.http_port == 0 {
            return Err(AppError::config("HTTP_PORT must be non-zero"));
        }
        self.relay.validate()
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Status Relay Configuration:\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Poll Interval: {}ms\n\
             - Keepalive Interval: {}ms\n\
             - Reap Delay: {}ms\n\
             - Channel Capacity: {}\n\
             - Completion Variants: {}",
            self.http_port,
            self.log_level,
            self.relay.poll_interval_ms,
            self.relay.keepalive_interval_ms,
            self.relay.reap_delay_ms,
            self.relay.channel_capacity,
            match self.relay.terminal_status_policy {
                TerminalStatusPolicy::Strict => "Disabled",
                TerminalStatusPolicy::CompleteVariants => "Enabled",
            },
        )
    }
}
