// ABOUTME: Main library entry point for the session status relay
// ABOUTME: Streams progress and final results of session-scoped analysis jobs over Server-Sent Events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Status Relay
//!
//! A push endpoint that lets one client watch an out-of-band batch analysis
//! job. The job (the producer) writes per-item status records and finally a
//! result list into a shared [`store::SessionStore`]; the relay polls that
//! state per subscription and streams `connected`, `update`, `error` and
//! finally `complete` events until the job finishes or the client leaves.
//!
//! ## Architecture
//!
//! - **store**: session-keyed status and result state, written by the producer
//! - **sse**: completion predicate, snapshot builder, stream driver and reaper
//! - **routes**: HTTP surface (status stream, health)
//! - **config** / **logging**: environment-driven ambient setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use status_relay::config::ServerConfig;
//! use status_relay::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Status relay configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Configuration management
pub mod config;

/// Application constants and default values
pub mod constants;

/// Unified error handling re-exported from `relay-core`
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// Shared server resources
pub mod resources;

/// HTTP route assembly
pub mod routes;

/// Session status streaming over Server-Sent Events
pub mod sse;

/// Session-keyed status and result store
pub mod store;

pub use relay_core::models;
