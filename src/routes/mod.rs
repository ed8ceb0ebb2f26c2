// ABOUTME: Route module organization for the status relay HTTP endpoints
// ABOUTME: Assembles the status stream and health routes into one router with request tracing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the status relay

/// Health check routes
pub mod health;

pub use health::HealthRoutes;

use crate::resources::ServerResources;
use crate::sse::SseRoutes;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the full application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(SseRoutes::routes(resources.clone()))
        .merge(HealthRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
}
