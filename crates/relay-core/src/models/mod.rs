// ABOUTME: Session record types shared between the analysis producer and the status relay
// ABOUTME: Per-item status records, final result records and the item status tag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Status tag of a single tracked item
///
/// Known tags get their own variant; anything else the producer writes is kept
/// verbatim so it round-trips to the client unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemStatus {
    /// Queued, not started
    Pending,
    /// Work in progress
    Running,
    /// Finished successfully
    Complete,
    /// Target could not be reached
    Unavailable,
    /// Nothing to analyze for this item
    NoSnapshots,
    /// Producer-specific tag
    Other(String),
}

impl ItemStatus {
    /// Wire representation of the tag
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Complete => "COMPLETE",
            Self::Unavailable => "UNAVAILABLE",
            Self::NoSnapshots => "NO_SNAPSHOTS",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ItemStatus {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "COMPLETE" => Self::Complete,
            "UNAVAILABLE" => Self::Unavailable,
            "NO_SNAPSHOTS" => Self::NoSnapshots,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for ItemStatus {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_owned())
    }
}

impl From<ItemStatus> for String {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known progress of one item within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    /// Item key, unique within the session
    #[serde(alias = "itemKey")]
    pub domain: String,
    /// Current status tag
    pub status: ItemStatus,
    /// Human-readable detail for the current status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    /// Producer fields the relay passes through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusRecord {
    /// Creates a record with no message and no extra fields
    pub fn new(domain: impl Into<String>, status: impl Into<ItemStatus>) -> Self {
        Self {
            domain: domain.into(),
            status: status.into(),
            last_message: None,
            extra: Map::new(),
        }
    }

    /// Attach a status message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.last_message = Some(message.into());
        self
    }
}

/// Final output for one item, written by the producer once the job is done
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Item key matching a [`StatusRecord::domain`]
    #[serde(alias = "itemKey")]
    pub domain: String,
    /// Status the producer recorded alongside the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    /// Failure description for this item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Arbitrary analysis payload
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ResultRecord {
    /// Creates an empty result for `domain`
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            status: None,
            error: None,
            payload: Map::new(),
        }
    }

    /// Set the embedded status
    #[must_use]
    pub fn with_status(mut self, status: impl Into<ItemStatus>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the embedded error
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Add a payload field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}
