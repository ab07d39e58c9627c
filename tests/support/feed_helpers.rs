//! Helpers for feed refresh behavioural tests.

use camino::Utf8PathBuf;
use gitfeed::FeedStore;
use tempfile::TempDir;
use wiremock::Mock;

use super::create_temp_dir;
use crate::feed_refresh_bdd_state::FeedState;
use crate::support::runtime::ensure_runtime_and_server;

/// Events endpoint for the repository every scenario follows.
pub const EVENTS_PATH: &str = "/repos/ReactiveX/RxSwift/events";

/// Creates a store rooted in a fresh temporary directory.
///
/// The directory must outlive the store, so both are returned.
pub fn create_store() -> (TempDir, FeedStore) {
    let temp_dir = create_temp_dir();
    let root = Utf8PathBuf::from_path_buf(temp_dir.path().join("gitfeed"))
        .unwrap_or_else(|path| panic!("temp dir is not UTF-8: {}", path.display()));
    let store = FeedStore::new(root).unwrap_or_else(|error| panic!("store should build: {error}"));
    (temp_dir, store)
}

/// Mounts `mock` on the scenario's server, starting it on first use.
pub fn mount_mock(feed_state: &FeedState, mock: Mock) {
    let runtime = ensure_runtime_and_server(&feed_state.runtime, &feed_state.server)
        .unwrap_or_else(|error| panic!("failed to create Tokio runtime: {error}"));

    feed_state
        .server
        .with_ref(|server| runtime.block_on(mock.mount(server)))
        .unwrap_or_else(|| panic!("mock server not initialised"));
}
