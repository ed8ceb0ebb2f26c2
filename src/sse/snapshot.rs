// ABOUTME: Snapshot builder turning a session's stored state into the next outbound stream event
// ABOUTME: Defines the connected/update/complete/error event payloads and the result merge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Stream events and the pure function that derives them from store state.
//!
//! Every event is one JSON object tagged by `type`. Stored records are never
//! modified: the `complete` payload is built from copies.

use super::completion::is_session_complete;
use crate::config::TerminalStatusPolicy;
use crate::constants::wire::DEFAULT_COMPLETE_MESSAGE;
use crate::errors::AppResult;
use crate::store::{SessionSnapshot, StatusMap};
use relay_core::models::{ItemStatus, ResultRecord, StatusRecord};
use serde::Serialize;

/// One event pushed to a status subscriber
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Subscription accepted
    Connected {
        /// Session being observed
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    /// Current status of every tracked item
    Update {
        /// Full status list, not a diff
        domains: Vec<StatusRecord>,
    },
    /// Final results merged with the latest item status
    Complete {
        /// One entry per result record, in result order
        domains: Vec<CompletedItem>,
    },
    /// Building a snapshot failed; the subscription stays open
    Error {
        /// Failure description
        message: String,
    },
}

impl StreamEvent {
    /// Event sent when a subscription opens
    pub fn connected(session_id: impl Into<String>) -> Self {
        Self::Connected {
            session_id: session_id.into(),
        }
    }

    /// In-stream error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Wire name of the event
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Update { .. } => "update",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    /// Whether delivering this event ends the subscription
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Serialize to the JSON text of one data frame
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized
    pub fn encode(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A result record merged with the item's latest status
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedItem {
    /// The producer's result, fields passed through as-is
    #[serde(flatten)]
    pub result: ResultRecord,
    /// Status from the status mapping, else the result's own status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_status: Option<ItemStatus>,
    /// Status message, else the result's error, else a fixed default
    pub last_message: String,
}

impl CompletedItem {
    /// Merge a result with the matching status record, if any
    #[must_use]
    pub fn merge(result: &ResultRecord, status: Option<&StatusRecord>) -> Self {
        let mut result = result.clone();
        // merged fields take precedence over same-named payload fields
        result.payload.remove("currentStatus");
        result.payload.remove("lastMessage");

        let current_status = status
            .map(|record| record.status.clone())
            .filter(|tag| !tag.as_str().is_empty())
            .or_else(|| result.status.clone());
        let last_message = status
            .and_then(|record| non_empty(record.last_message.as_deref()))
            .or_else(|| non_empty(result.error.as_deref()))
            .unwrap_or(DEFAULT_COMPLETE_MESSAGE)
            .to_owned();

        Self {
            result,
            current_status,
            last_message,
        }
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.is_empty())
}

/// Derives the next event for a subscription from store state
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotBuilder {
    policy: TerminalStatusPolicy,
}

impl SnapshotBuilder {
    /// Creates a builder using `policy` for completion decisions
    #[must_use]
    pub const fn new(policy: TerminalStatusPolicy) -> Self {
        Self { policy }
    }

    /// Next event for the session, or `None` while the producer has not seeded it
    #[must_use]
    pub fn next_event(&self, snapshot: &SessionSnapshot) -> Option<StreamEvent> {
        let statuses = snapshot.statuses.as_ref()?;
        let results = snapshot.results.as_deref();

        if is_session_complete(statuses.values(), results, self.policy) {
            let domains = results
                .unwrap_or_default()
                .iter()
                .map(|result| CompletedItem::merge(result, statuses.get(&result.domain)))
                .collect();
            return Some(StreamEvent::Complete { domains });
        }

        Some(StreamEvent::Update {
            domains: status_list(statuses),
        })
    }
}

fn status_list(statuses: &StatusMap) -> Vec<StatusRecord> {
    statuses.values().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(statuses: &[(&str, &str)], results: Option<Vec<ResultRecord>>) -> SessionSnapshot {
        SessionSnapshot {
            statuses: Some(
                statuses
                    .iter()
                    .map(|(key, tag)| ((*key).to_owned(), StatusRecord::new(*key, *tag)))
                    .collect(),
            ),
            results,
        }
    }

    #[test]
    fn test_no_event_without_status_mapping() {
        let builder = SnapshotBuilder::default();
        let unseeded = SessionSnapshot {
            statuses: None,
            results: Some(vec![ResultRecord::new("x.com")]),
        };
        assert!(builder.next_event(&unseeded).is_none());
        assert!(builder.next_event(&SessionSnapshot::default()).is_none());
    }

    #[test]
    fn test_update_carries_full_status_list() {
        let builder = SnapshotBuilder::default();
        let event = builder
            .next_event(&snapshot(&[("x.com", "RUNNING"), ("y.com", "COMPLETE")], None))
            .unwrap();

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "update");
        assert_eq!(value["domains"].as_array().unwrap().len(), 2);
        assert_eq!(value["domains"][0]["domain"], "x.com");
        assert_eq!(value["domains"][0]["status"], "RUNNING");
    }

    #[test]
    fn test_terminal_statuses_without_results_stay_update() {
        let builder = SnapshotBuilder::default();
        let event = builder
            .next_event(&snapshot(&[("x.com", "COMPLETE")], Some(Vec::new())))
            .unwrap();
        assert_eq!(event.kind(), "update");
    }

    #[test]
    fn test_complete_merges_status_into_results() {
        let builder = SnapshotBuilder::default();
        let mut state = snapshot(
            &[("x.com", "COMPLETE"), ("y.com", "UNAVAILABLE")],
            Some(vec![
                ResultRecord::new("x.com").with_field("spamScore", json!(0.1)),
                ResultRecord::new("y.com").with_error("Host unreachable"),
            ]),
        );
        if let Some(statuses) = state.statuses.as_mut() {
            statuses.insert(
                "x.com".to_owned(),
                StatusRecord::new("x.com", "COMPLETE").with_message("42 snapshots analyzed"),
            );
        }

        let event = builder.next_event(&state).unwrap();
        assert!(event.is_terminal());

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["domains"][0]["domain"], "x.com");
        assert_eq!(value["domains"][0]["spamScore"], 0.1);
        assert_eq!(value["domains"][0]["currentStatus"], "COMPLETE");
        assert_eq!(value["domains"][0]["lastMessage"], "42 snapshots analyzed");
        assert_eq!(value["domains"][1]["currentStatus"], "UNAVAILABLE");
        assert_eq!(value["domains"][1]["lastMessage"], "Host unreachable");
    }

    #[test]
    fn test_merge_falls_back_to_result_fields() {
        let result = ResultRecord::new("z.com").with_status("NO_SNAPSHOTS");
        let merged = CompletedItem::merge(&result, None);
        assert_eq!(merged.current_status, Some(ItemStatus::NoSnapshots));
        assert_eq!(merged.last_message, "Analysis complete");

        let bare = CompletedItem::merge(&ResultRecord::new("z.com"), None);
        let value = serde_json::to_value(&bare).unwrap();
        assert!(value.get("currentStatus").is_none());
        assert_eq!(value["lastMessage"], "Analysis complete");
    }

    #[test]
    fn test_merge_empty_status_tag_uses_result_status() {
        let result = ResultRecord::new("x.com").with_status("UNAVAILABLE");
        let status = StatusRecord::new("x.com", "");

        let merged = CompletedItem::merge(&result, Some(&status));
        assert_eq!(merged.current_status, Some(ItemStatus::Unavailable));
    }

    #[test]
    fn test_merge_does_not_touch_source_record() {
        let result = ResultRecord::new("x.com").with_field("lastMessage", json!("stale"));
        let status = StatusRecord::new("x.com", "COMPLETE");

        let merged = CompletedItem::merge(&result, Some(&status));
        assert_eq!(merged.last_message, "Analysis complete");
        assert!(!merged.result.payload.contains_key("lastMessage"));
        assert_eq!(result.payload["lastMessage"], "stale");
    }

    #[test]
    fn test_connected_and_error_wire_format() {
        let connected = StreamEvent::connected("abc").encode().unwrap();
        assert_eq!(connected, r#"{"type":"connected","sessionId":"abc"}"#);

        let error = StreamEvent::error("boom").encode().unwrap();
        assert_eq!(error, r#"{"type":"error","message":"boom"}"#);
    }
}
