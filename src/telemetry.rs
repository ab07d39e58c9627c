//! Feed telemetry events and sinks.
//!
//! GitFeed runs locally, but the host can opt into a JSONL stream of
//! refresh outcomes on stderr for debugging polling behaviour.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by the feed service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A refresh finished and the observer received a snapshot.
    RefreshCompleted {
        /// Repositories whose events were requested.
        candidates: usize,
        /// Events merged into the cache by this refresh.
        new_events: usize,
        /// Candidates answered with "not modified".
        not_modified: usize,
        /// Cache length after the merge.
        cached_events: usize,
        /// Candidates whose request failed.
        failed_candidates: usize,
    },
    /// A refresh failed as a whole and the cache was left untouched.
    RefreshFailed {
        /// Display form of the error handed to the observer.
        message: String,
        /// Seconds until GitHub's rate limit window resets, when the
        /// refresh failed on an exhausted quota.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry_after_seconds: Option<u64>,
    },
    /// A fresh `Last-Modified` marker was adopted.
    MarkerAdopted {
        /// The repository whose response carried the marker.
        repository: String,
        /// Whether the marker reached disk.
        persisted: bool,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// This is intended for local debugging and is not transmitted anywhere.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

#[cfg(test)]
mod tests {
    use super::TelemetryEvent;

    #[test]
    fn events_serialise_with_snake_case_tag() {
        let event = TelemetryEvent::MarkerAdopted {
            repository: "ReactiveX/RxSwift".to_owned(),
            persisted: true,
        };

        let json = serde_json::to_value(&event).expect("event should serialise");

        assert_eq!(
            json,
            serde_json::json!({
                "type": "marker_adopted",
                "repository": "ReactiveX/RxSwift",
                "persisted": true
            })
        );
    }

    #[test]
    fn refresh_failed_round_trips() {
        let event = TelemetryEvent::RefreshFailed {
            message: "network error: timed out".to_owned(),
            retry_after_seconds: None,
        };

        let json = serde_json::to_string(&event).expect("event should serialise");
        let decoded: TelemetryEvent = serde_json::from_str(&json).expect("event should decode");

        assert_eq!(decoded, event);
        assert!(!json.contains("retry_after_seconds"));
    }

    #[test]
    fn refresh_failed_carries_rate_limit_wait() {
        let event = TelemetryEvent::RefreshFailed {
            message: "rate limit exceeded".to_owned(),
            retry_after_seconds: Some(120),
        };

        let json = serde_json::to_value(&event).expect("event should serialise");

        assert_eq!(json["retry_after_seconds"], 120);
    }
}
