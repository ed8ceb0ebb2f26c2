// ABOUTME: HTTP-level tests for the status stream and health routes
// ABOUTME: Exercises request validation, stream headers and full streams through the Axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::{Method, StatusCode};
use common::{create_test_resources, seed_status};
use helpers::axum_test::AxumTestRequest;
use serde_json::Value;
use status_relay::{
    models::{ItemStatus, ResultRecord},
    routes::build_router,
};

const STREAM_PATH: &str = "/api/wayback/analyze-complete-status";

fn data_lines(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|json| serde_json::from_str(json).unwrap())
        .collect()
}

#[tokio::test]
async fn test_missing_session_id_is_bad_request() {
    let resources = create_test_resources();

    let response = AxumTestRequest::get(STREAM_PATH)
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_ne!(response.header("content-type"), Some("text/event-stream"));
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
    assert_eq!(resources.subscriptions.active_subscriptions(), 0);
}

#[tokio::test]
async fn test_empty_session_id_is_bad_request() {
    let resources = create_test_resources();

    let response = AxumTestRequest::get(&format!("{STREAM_PATH}?sessionId="))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
}

#[tokio::test]
async fn test_head_does_not_open_a_stream() {
    let resources = create_test_resources();
    seed_status(&resources.store, "abc", "x.com", ItemStatus::Running);

    let response = AxumTestRequest::with_method(Method::HEAD, &format!("{STREAM_PATH}?sessionId=abc"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);

    assert_ne!(response.header("content-type"), Some("text/event-stream"));
    assert_eq!(resources.subscriptions.active_subscriptions(), 0);
    assert_eq!(resources.reaper.pending(), 0);
}

#[tokio::test]
async fn test_repeated_session_id_gets_structured_error() {
    let resources = create_test_resources();

    let response = AxumTestRequest::get(&format!("{STREAM_PATH}?sessionId=a&sessionId=b"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query string"));
    assert_eq!(resources.subscriptions.active_subscriptions(), 0);
}

#[tokio::test]
async fn test_other_methods_are_rejected() {
    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let resources = create_test_resources();

        let response = AxumTestRequest::with_method(method, &format!("{STREAM_PATH}?sessionId=abc"))
            .send(build_router(resources.clone()))
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);

        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
        assert_eq!(resources.subscriptions.active_subscriptions(), 0);
    }
}

#[tokio::test]
async fn test_stream_sets_event_stream_headers() {
    let resources = create_test_resources();
    seed_status(&resources.store, "abc", "x.com", ItemStatus::Running);

    let response = AxumTestRequest::get(&format!("{STREAM_PATH}?sessionId=abc"))
        .send_sse(build_router(resources))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(response.header("content-type"), Some("text/event-stream"));
    assert_eq!(response.header("cache-control"), Some("no-cache"));
    assert_eq!(response.header("x-accel-buffering"), Some("no"));
    assert_eq!(response.header("connection"), Some("keep-alive"));

    let events = data_lines(&response.text());
    assert_eq!(events[0]["type"], "connected");
    assert_eq!(events[0]["sessionId"], "abc");
}

#[tokio::test]
async fn test_finished_session_streams_to_completion() {
    let resources = create_test_resources();
    seed_status(&resources.store, "done", "x.com", ItemStatus::Complete);
    resources
        .store
        .set_results("done", vec![ResultRecord::new("x.com")])
        .unwrap();

    let response = AxumTestRequest::get(&format!("{STREAM_PATH}?sessionId=done"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::OK);

    let events = data_lines(&response.text());
    let kinds: Vec<_> = events.iter().map(|event| event["type"].clone()).collect();
    assert_eq!(kinds, ["connected", "complete"]);
    assert_eq!(events[1]["domains"][0]["currentStatus"], "COMPLETE");

    assert!(resources.store.get_results("done").is_none());
    assert!(resources.store.get_status("done").is_some());
    assert_eq!(resources.reaper.pending(), 1);
}

#[tokio::test]
async fn test_health_reports_relay_counts() {
    let resources = create_test_resources();
    seed_status(&resources.store, "abc", "x.com", ItemStatus::Running);

    let response = AxumTestRequest::get("/health")
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tracked_sessions"], 1);
    assert_eq!(body["active_subscriptions"], 0);
    assert_eq!(body["pending_reaps"], 0);
    assert!(body["timestamp"].is_string());
}
