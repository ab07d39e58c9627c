//! Merging freshly fetched events into the bounded cache.

use std::collections::HashSet;

use crate::github::models::Event;

/// How the merge treats an incoming event whose id is already cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Prepend every incoming event, even when its id is already cached.
    #[default]
    KeepAll,
    /// Drop incoming events whose id is already cached or repeated earlier
    /// in the same batch.
    SkipKnownIds,
}

impl DuplicatePolicy {
    /// Maps the `dedupe_events` configuration flag to a policy.
    #[must_use]
    pub const fn from_flag(dedupe: bool) -> Self {
        if dedupe {
            Self::SkipKnownIds
        } else {
            Self::KeepAll
        }
    }
}

/// Result of merging one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// The new cache contents, newest first.
    pub events: Vec<Event>,
    /// Incoming events that made it into the merged sequence before
    /// truncation.
    pub inserted: usize,
    /// Incoming events skipped as duplicates.
    pub skipped_duplicates: usize,
}

/// Prepends `incoming` to `existing` in received order and truncates to
/// `cap`.
///
/// A `cap` of zero is treated as one so the newest event always survives.
///
/// # Examples
///
/// ```
/// use gitfeed::feed::{DuplicatePolicy, merge_events};
/// use gitfeed::github::models::test_support::numbered_events;
///
/// let existing = numbered_events("old", 3);
/// let incoming = numbered_events("new", 2);
/// let merged = merge_events(&existing, incoming, 4, DuplicatePolicy::KeepAll);
///
/// let ids: Vec<&str> = merged.events.iter().map(|e| e.id.as_str()).collect();
/// assert_eq!(ids, ["new-0", "new-1", "old-0", "old-1"]);
/// ```
#[must_use]
pub fn merge_events(
    existing: &[Event],
    incoming: Vec<Event>,
    cap: usize,
    policy: DuplicatePolicy,
) -> MergeResult {
    let limit = cap.max(1);
    let incoming_count = incoming.len();

    let fresh: Vec<Event> = match policy {
        DuplicatePolicy::KeepAll => incoming,
        DuplicatePolicy::SkipKnownIds => {
            let seen: HashSet<&str> = existing.iter().map(|event| event.id.as_str()).collect();
            let mut kept_ids: HashSet<String> = HashSet::new();
            incoming
                .into_iter()
                .filter(|event| {
                    !seen.contains(event.id.as_str()) && kept_ids.insert(event.id.clone())
                })
                .collect()
        }
    };

    let inserted = fresh.len();
    let events: Vec<Event> = fresh
        .into_iter()
        .chain(existing.iter().cloned())
        .take(limit)
        .collect();

    MergeResult {
        events,
        inserted,
        skipped_duplicates: incoming_count.saturating_sub(inserted),
    }
}
