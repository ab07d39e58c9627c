//! Then steps for feed refresh behavioural tests.

use gitfeed::{Event, FeedError};
use rstest_bdd_macros::then;

use crate::feed_refresh_bdd_state::FeedState;

fn current_events(feed_state: &FeedState) -> Vec<Event> {
    feed_state
        .events
        .get()
        .unwrap_or_else(|| panic!("refresh has not run"))
}

#[then("the feed holds {count:usize} events")]
fn assert_event_count(feed_state: &FeedState, count: usize) {
    let events = current_events(feed_state);

    assert_eq!(events.len(), count, "unexpected cache length");
}

#[then("the stored fetch marker is {marker}")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
fn assert_stored_marker(feed_state: &FeedState, marker: String) {
    let store = feed_state.store.get().expect("feed store missing");

    let stored = store.load_marker().expect("marker file should read");

    assert_eq!(
        stored.as_ref().map(gitfeed::FetchMarker::as_str),
        Some(marker.trim_matches('"')),
        "unexpected stored marker"
    );
}

#[then("the persisted cache matches the feed")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
fn assert_persisted_cache(feed_state: &FeedState) {
    let store = feed_state.store.get().expect("feed store missing");

    let persisted = store.load_events().expect("cache file should read");

    assert_eq!(
        persisted,
        Some(current_events(feed_state)),
        "persisted cache should round-trip the in-memory feed"
    );
}

#[then("the newest {count:usize} events are the fetched batch")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
fn assert_newest_batch(feed_state: &FeedState, count: usize) {
    let fetched = feed_state.fetched.get().expect("fetched batch missing");
    let events = current_events(feed_state);

    let newest: Vec<&str> = events.iter().take(count).map(|e| e.id.as_str()).collect();
    let expected: Vec<&str> = fetched.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(newest, expected, "fetched batch should lead in received order");
    assert!(
        events
            .iter()
            .skip(count)
            .all(|event| event.id.starts_with("cached-")),
        "older events should follow the fetched batch"
    );
}

#[then("the refresh fails with an API error")]
fn assert_api_error(feed_state: &FeedState) {
    let error = feed_state.error.get();

    assert!(
        matches!(error, Some(FeedError::Api { .. })),
        "expected API error, got {error:?}"
    );
}

#[then("the refresh skipped {count:usize} undecodable payload")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
fn assert_decode_failures(feed_state: &FeedState, count: usize) {
    let report = feed_state.report.get().expect("refresh report missing");

    assert_eq!(report.decode_failures, count);
    assert_eq!(report.new_events, 0);
}

#[then("the GitHub API mocks are satisfied")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
fn verify_mocks(feed_state: &FeedState) {
    let runtime = feed_state.runtime.get().expect("runtime not initialised");
    feed_state
        .server
        .with_ref(|server| runtime.block_on(server.verify()))
        .expect("mock server not initialised");
}
