// ABOUTME: Health check route handlers for service monitoring
// ABOUTME: Reports liveness plus subscription, session and pending-reap counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring

use crate::constants::{routes::HEALTH, service_names};
use crate::resources::ServerResources;
use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(HEALTH, get(Self::handle_health))
            .with_state(resources)
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "service": service_names::STATUS_RELAY,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
            "active_subscriptions": resources.subscriptions.active_subscriptions(),
            "tracked_sessions": resources.store.session_count(),
            "pending_reaps": resources.reaper.pending(),
        }))
    }
}
