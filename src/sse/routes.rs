// ABOUTME: HTTP route handler opening a session status stream over Server-Sent Events
// ABOUTME: Validates method and session id, then bridges the stream driver's frames to the response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::driver::{Frame, StreamDriver};
use crate::constants::{routes::ANALYZE_COMPLETE_STATUS, wire::SESSION_ID_PARAM};
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderName, Method},
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
    routing::get,
    Router,
};
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Query parameters of the status stream
#[derive(Debug, Deserialize)]
pub struct StatusStreamParams {
    /// Session to observe
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

impl Frame {
    /// Convert to an SSE event
    #[must_use]
    pub fn into_event(self) -> Event {
        match self {
            Self::Data(json) => Event::default().data(json),
            Self::Comment(text) => Event::default().comment(text),
        }
    }
}

/// SSE routes implementation
pub struct SseRoutes;

impl SseRoutes {
    /// Create the status stream route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                ANALYZE_COMPLETE_STATUS,
                get(Self::handle_status_stream)
                    .head(Self::handle_method_not_allowed)
                    .fallback(Self::handle_method_not_allowed),
            )
            .with_state(resources)
    }

    /// Open a status stream for `sessionId`
    async fn handle_status_stream(
        State(resources): State<Arc<ServerResources>>,
        query: Result<Query<StatusStreamParams>, QueryRejection>,
    ) -> Result<impl IntoResponse, AppError> {
        let Query(params) = query.map_err(|rejection| {
            AppError::invalid_input(format!("Invalid query string: {}", rejection.body_text()))
        })?;
        let session_id = params
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::missing_field(SESSION_ID_PARAM))?;

        tracing::info!("New status SSE connection for session: {}", session_id);

        let (_subscription, receiver) = StreamDriver::open(&resources, &session_id);
        let stream =
            ReceiverStream::new(receiver).map(|frame| Ok::<_, Infallible>(frame.into_event()));

        Ok((
            [
                (header::CONNECTION, "keep-alive"),
                (X_ACCEL_BUFFERING, "no"),
            ],
            Sse::new(stream),
        ))
    }

    async fn handle_method_not_allowed(method: Method) -> AppError {
        AppError::method_not_allowed(method)
    }
}

