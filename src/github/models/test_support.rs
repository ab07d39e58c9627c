//! Test helpers for constructing `Event` fixtures.
//!
//! # Examples
//!
//! ```
//! use gitfeed::github::models::test_support::{event_with_id, numbered_events};
//!
//! let event = event_with_id("42");
//! assert_eq!(event.id, "42");
//!
//! let batch = numbered_events("new", 3);
//! assert_eq!(batch.len(), 3);
//! ```

use chrono::{DateTime, TimeZone, Utc};

use super::{Actor, Event};

const BASE_TIMESTAMP: i64 = 1_714_564_800;

fn timestamp(offset_seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_TIMESTAMP.saturating_add(offset_seconds), 0)
        .single()
        .unwrap_or_default()
}

/// Constructs a `PushEvent` by `octocat` on `ReactiveX/RxSwift`.
#[must_use]
pub fn event_with_id(id: &str) -> Event {
    Event {
        id: id.to_owned(),
        action: "PushEvent".to_owned(),
        actor: Actor {
            name: "octocat".to_owned(),
            avatar_url: "https://avatars.example.invalid/octocat".to_owned(),
        },
        repo_name: "ReactiveX/RxSwift".to_owned(),
        created_at: timestamp(0),
    }
}

/// Builds `count` events with ids `{prefix}-0` .. `{prefix}-{count-1}`.
///
/// Earlier indices get later timestamps, so the batch is newest first the way
/// GitHub returns it.
#[must_use]
pub fn numbered_events(prefix: &str, count: usize) -> Vec<Event> {
    (0..count)
        .map(|index| {
            let offset = i64::try_from(count.saturating_sub(index)).unwrap_or(i64::MAX);
            Event {
                created_at: timestamp(offset),
                ..event_with_id(&format!("{prefix}-{index}"))
            }
        })
        .collect()
}

/// Renders events in the GitHub events-list wire format.
#[must_use]
pub fn events_to_api_json(events: &[Event]) -> serde_json::Value {
    serde_json::Value::Array(
        events
            .iter()
            .map(|event| {
                serde_json::json!({
                    "id": event.id,
                    "type": event.action,
                    "actor": {
                        "login": event.actor.name,
                        "avatar_url": event.actor.avatar_url,
                    },
                    "repo": { "name": event.repo_name },
                    "created_at": event.created_at.to_rfc3339(),
                })
            })
            .collect(),
    )
}
