//! Behavioural tests for refreshing the repository event feed.

mod support {
    #[path = "../support/mod.rs"]
    mod common;

    pub use common::create_temp_dir;

    #[path = "../support/feed_helpers.rs"]
    pub mod feed_helpers;
    #[path = "../support/runtime.rs"]
    pub mod runtime;
}

#[path = "feed_refresh_bdd/given.rs"]
mod feed_refresh_bdd_given;
#[path = "feed_refresh_bdd/state.rs"]
mod feed_refresh_bdd_state;
#[path = "feed_refresh_bdd/then.rs"]
mod feed_refresh_bdd_then;
#[path = "feed_refresh_bdd/when.rs"]
mod feed_refresh_bdd_when;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use feed_refresh_bdd_state::FeedState;

#[fixture]
fn feed_state() -> FeedState {
    FeedState::default()
}

#[scenario(path = "tests/features/feed_refresh.feature", index = 0)]
fn first_refresh_caches_events(feed_state: FeedState) {
    let _ = feed_state;
}

#[scenario(path = "tests/features/feed_refresh.feature", index = 1)]
fn not_modified_keeps_cache(feed_state: FeedState) {
    let _ = feed_state;
}

#[scenario(path = "tests/features/feed_refresh.feature", index = 2)]
fn full_cache_keeps_newest(feed_state: FeedState) {
    let _ = feed_state;
}

#[scenario(path = "tests/features/feed_refresh.feature", index = 3)]
fn server_error_leaves_cache(feed_state: FeedState) {
    let _ = feed_state;
}

#[scenario(path = "tests/features/feed_refresh.feature", index = 4)]
fn malformed_payload_yields_nothing(feed_state: FeedState) {
    let _ = feed_state;
}
