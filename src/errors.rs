// ABOUTME: Re-exports the unified error types from relay-core
// ABOUTME: Keeps `crate::errors` as the import path used across the service crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The error types live in `relay-core` so the producer side can share them;
//! this module re-exports them for the service crate.

pub use relay_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
