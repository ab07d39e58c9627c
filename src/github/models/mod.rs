//! Data models representing repository activity events.
//!
//! Types prefixed with `Api` are internal deserialisation targets for the
//! GitHub wire format and convert into the public domain types. The domain
//! types carry their own serde derives because they are also the on-disk
//! cache format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::FeedError;

#[cfg(feature = "test-support")]
pub mod test_support;

/// The user who triggered an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// GitHub login.
    pub name: String,
    /// Avatar image URL; empty when GitHub omitted it.
    #[serde(default)]
    pub avatar_url: String,
}

/// A single repository activity event.
///
/// Events are append-only: nothing in this crate mutates one after it has
/// been decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// GitHub event identifier.
    pub id: String,
    /// Event type such as `PushEvent` or `WatchEvent`.
    pub action: String,
    /// Who triggered the event.
    pub actor: Actor,
    /// `owner/name` of the repository the event belongs to.
    pub repo_name: String,
    /// When GitHub recorded the event.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Event type without the `Event` suffix, lower-cased
    /// (`PushEvent` becomes `push`).
    #[must_use]
    pub fn short_action(&self) -> String {
        self.action.replace("Event", "").to_lowercase()
    }

    /// One-line rendering used by hosts that list events as text.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use gitfeed::github::{Actor, Event};
    ///
    /// let event = Event {
    ///     id: "1".to_owned(),
    ///     action: "PushEvent".to_owned(),
    ///     actor: Actor { name: "octocat".to_owned(), avatar_url: String::new() },
    ///     repo_name: "ReactiveX/RxSwift".to_owned(),
    ///     created_at: Utc.timestamp_opt(0, 0).single().expect("valid timestamp"),
    /// };
    /// assert_eq!(event.summary_line(), "octocat: ReactiveX/RxSwift, push");
    /// ```
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {}, {}",
            self.actor.name,
            self.repo_name,
            self.short_action()
        )
    }
}

/// Opaque conditional-fetch token, taken from a `Last-Modified` response
/// header and replayed as `If-Modified-Since`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchMarker(String);

impl FetchMarker {
    /// Wraps a token, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Decode`] when the token is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, FeedError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(FeedError::Decode {
                message: "fetch marker must not be blank".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Events decoded from one response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedEvents {
    /// Events that decoded cleanly, in response order.
    pub events: Vec<Event>,
    /// Items (or whole bodies) that could not be decoded.
    pub failures: usize,
}

/// Decodes a GitHub events-list body.
///
/// Decoding is tolerant: items that do not match the event shape are skipped
/// and counted, and a body that is not a JSON array counts as one failure
/// with no events.
#[must_use]
pub fn decode_event_list(body: &str) -> DecodedEvents {
    let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(body) else {
        tracing::debug!("events body is not a JSON array; treating as empty");
        return DecodedEvents {
            events: Vec::new(),
            failures: 1,
        };
    };

    let mut decoded = DecodedEvents::default();
    for item in items {
        match serde_json::from_value::<ApiEvent>(item) {
            Ok(api) => decoded.events.push(api.into()),
            Err(error) => {
                tracing::debug!("skipping undecodable event: {error}");
                decoded.failures = decoded.failures.saturating_add(1);
            }
        }
    }
    decoded
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiEvent {
    pub(super) id: String,
    #[serde(rename = "type")]
    pub(super) kind: String,
    pub(super) actor: ApiActor,
    pub(super) repo: ApiRepo,
    pub(super) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiActor {
    pub(super) login: String,
    pub(super) avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepo {
    pub(super) name: String,
}

/// Body of `GET /search/repositories`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct ApiSearchResponse {
    #[serde(default)]
    pub(super) items: Vec<ApiSearchItem>,
}

impl ApiSearchResponse {
    /// Decodes a search body, which must be a JSON object.
    pub(super) fn from_body(body: &str) -> Result<Self, FeedError> {
        let decode_error = |message: String| FeedError::Decode {
            message: format!("repository search deserialisation failed: {message}"),
        };
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|error| decode_error(error.to_string()))?;
        if !value.is_object() {
            return Err(decode_error("expected a JSON object".to_owned()));
        }
        serde_json::from_value(value).map_err(|error| decode_error(error.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiSearchItem {
    pub(super) full_name: String,
}

impl From<ApiEvent> for Event {
    fn from(value: ApiEvent) -> Self {
        Self {
            id: value.id,
            action: value.kind,
            actor: Actor {
                name: value.actor.login,
                avatar_url: value.actor.avatar_url.unwrap_or_default(),
            },
            repo_name: value.repo.name,
            created_at: value.created_at,
        }
    }
}
