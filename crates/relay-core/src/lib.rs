// ABOUTME: Core types for the session status relay
// ABOUTME: Foundation crate with error handling and session record models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Relay Core
//!
//! Foundation crate providing shared types for the status relay. It holds
//! the types that both the analysis producer and the streaming side agree on,
//! and is designed to change infrequently.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and HTTP responses
//! - **models**: Status and result records written by the producer

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Session status and result records
pub mod models;
