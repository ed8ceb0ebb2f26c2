// ABOUTME: Completion predicate deciding when a session's analysis job is finished
// ABOUTME: Classifies item status tags as terminal under the configured policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::TerminalStatusPolicy;
use crate::constants::wire::COMPLETE_VARIANT_SUFFIX;
use relay_core::models::{ItemStatus, ResultRecord, StatusRecord};

/// Whether no further progress will happen for an item with this status
#[must_use]
pub fn is_terminal(status: &ItemStatus, policy: TerminalStatusPolicy) -> bool {
    match status {
        ItemStatus::Complete | ItemStatus::Unavailable | ItemStatus::NoSnapshots => true,
        ItemStatus::Pending | ItemStatus::Running => false,
        ItemStatus::Other(tag) => {
            policy == TerminalStatusPolicy::CompleteVariants
                && tag.len() > COMPLETE_VARIANT_SUFFIX.len()
                && tag.ends_with(COMPLETE_VARIANT_SUFFIX)
        }
    }
}

/// A session is complete once results are published and every tracked item is terminal
///
/// An absent or empty result list never completes the session, whatever the
/// statuses say.
pub fn is_session_complete<'a, I>(
    statuses: I,
    results: Option<&[ResultRecord]>,
    policy: TerminalStatusPolicy,
) -> bool
where
    I: IntoIterator<Item = &'a StatusRecord>,
{
    results.is_some_and(|results| !results.is_empty())
        && statuses
            .into_iter()
            .all(|record| is_terminal(&record.status, policy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(tags: &[&str]) -> Vec<StatusRecord> {
        tags.iter()
            .enumerate()
            .map(|(i, tag)| StatusRecord::new(format!("d{i}.com"), *tag))
            .collect()
    }

    #[test]
    fn test_fixed_terminal_set() {
        for tag in ["COMPLETE", "UNAVAILABLE", "NO_SNAPSHOTS"] {
            assert!(is_terminal(&tag.into(), TerminalStatusPolicy::Strict), "{tag}");
        }
        for tag in ["PENDING", "RUNNING", "FAILED"] {
            assert!(!is_terminal(&tag.into(), TerminalStatusPolicy::Strict), "{tag}");
        }
    }

    #[test]
    fn test_variant_tags_only_under_variant_policy() {
        let variant = ItemStatus::from("SPAM_COMPLETE");
        assert!(!is_terminal(&variant, TerminalStatusPolicy::Strict));
        assert!(is_terminal(&variant, TerminalStatusPolicy::CompleteVariants));
    }

    #[test]
    fn test_incomplete_is_never_terminal() {
        // Substring matching would misclassify these
        for tag in ["INCOMPLETE", "_COMPLETE", "COMPLETE_PENDING"] {
            assert!(
                !is_terminal(&tag.into(), TerminalStatusPolicy::CompleteVariants),
                "{tag}"
            );
        }
    }

    #[test]
    fn test_requires_non_empty_results() {
        let statuses = records(&["COMPLETE", "UNAVAILABLE"]);
        let policy = TerminalStatusPolicy::Strict;

        assert!(!is_session_complete(&statuses, None, policy));
        assert!(!is_session_complete(&statuses, Some(&[]), policy));
        assert!(is_session_complete(
            &statuses,
            Some(&[ResultRecord::new("d0.com")]),
            policy
        ));
    }

    #[test]
    fn test_any_running_item_blocks_completion() {
        let statuses = records(&["COMPLETE", "RUNNING"]);
        assert!(!is_session_complete(
            &statuses,
            Some(&[ResultRecord::new("d0.com")]),
            TerminalStatusPolicy::Strict
        ));
    }
}
