//! Given steps for feed refresh behavioural tests.

use gitfeed::FetchMarker;
use gitfeed::github::models::test_support::{events_to_api_json, numbered_events};
use rstest_bdd_macros::given;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, Request, ResponseTemplate};

use crate::feed_refresh_bdd_state::FeedState;
use crate::support::feed_helpers::{EVENTS_PATH, create_store, mount_mock};

#[given("an empty feed cache")]
fn empty_cache(feed_state: &FeedState) {
    let (temp_dir, store) = create_store();
    feed_state.temp_dir.set(temp_dir);
    feed_state.store.set(store);
}

#[given("a feed cache holding {count:usize} events")]
fn cache_with_events(feed_state: &FeedState, count: usize) {
    let (temp_dir, store) = create_store();
    store
        .save_events(&numbered_events("cached", count))
        .unwrap_or_else(|error| panic!("cached events should save: {error}"));
    feed_state.temp_dir.set(temp_dir);
    feed_state.store.set(store);
}

#[given("a feed cache holding {count:usize} events and the fetch marker {marker}")]
fn cache_with_events_and_marker(feed_state: &FeedState, count: usize, marker: String) {
    cache_with_events(feed_state, count);
    let token = FetchMarker::new(marker.trim_matches('"'))
        .unwrap_or_else(|error| panic!("marker should be valid: {error}"));
    feed_state
        .store
        .with_ref(|store| store.save_marker(&token))
        .unwrap_or_else(|| panic!("store not initialised"))
        .unwrap_or_else(|error| panic!("marker should save: {error}"));
}

#[given("a GitHub server returning {count:usize} events with Last-Modified {marker}")]
fn server_returning_events(feed_state: &FeedState, count: usize, marker: String) {
    let fetched = numbered_events("fetched", count);
    let mock = Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(events_to_api_json(&fetched))
                .insert_header("Last-Modified", marker.trim_matches('"')),
        )
        .expect(1)
        .named("events list");

    mount_mock(feed_state, mock);
    feed_state.fetched.set(fetched);
}

#[given("a GitHub server answering not modified to {sent} with Last-Modified {fresh}")]
fn server_answering_not_modified(feed_state: &FeedState, sent: String, fresh: String) {
    let expected = sent.trim_matches('"').to_owned();
    let mock = Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(header_exists("if-modified-since"))
        .and(move |request: &Request| {
            request
                .headers
                .get("if-modified-since")
                .and_then(|value| value.to_str().ok())
                == Some(expected.as_str())
        })
        .respond_with(
            ResponseTemplate::new(304).insert_header("Last-Modified", fresh.trim_matches('"')),
        )
        .expect(1)
        .named("conditional events list");

    mount_mock(feed_state, mock);
}

#[given("a GitHub server failing with status {status:u16}")]
fn server_failing(feed_state: &FeedState, status: u16) {
    let mock = Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(serde_json::json!({ "message": "Server Error" })),
        )
        .named("failing events list");

    mount_mock(feed_state, mock);
}

#[given("a GitHub server returning a malformed events body")]
fn server_returning_malformed_body(feed_state: &FeedState) {
    let mock = Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<plist>not json</plist>"))
        .named("malformed events list");

    mount_mock(feed_state, mock);
}
