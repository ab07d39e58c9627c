//! Scenario state for feed refresh behavioural tests.

use gitfeed::{Event, FeedError, FeedStore, RefreshReport};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;
use wiremock::MockServer;

pub(crate) use crate::support::runtime::SharedRuntime;

#[derive(ScenarioState, Default)]
pub(crate) struct FeedState {
    pub(crate) runtime: Slot<SharedRuntime>,
    pub(crate) server: Slot<MockServer>,
    pub(crate) temp_dir: Slot<TempDir>,
    pub(crate) store: Slot<FeedStore>,
    pub(crate) fetched: Slot<Vec<Event>>,
    pub(crate) events: Slot<Vec<Event>>,
    pub(crate) report: Slot<RefreshReport>,
    pub(crate) error: Slot<FeedError>,
}
