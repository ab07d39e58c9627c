//! When steps for feed refresh behavioural tests.

use std::sync::Arc;

use gitfeed::github::ApiBase;
use gitfeed::{EventFeedService, FeedError, FeedTarget, OctocrabEventGateway};
use rstest_bdd_macros::when;
use wiremock::MockServer;

use crate::feed_refresh_bdd_state::FeedState;
use crate::support::runtime::ensure_runtime_and_server;

#[when("the feed refreshes {repository}")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
fn refresh_feed(feed_state: &FeedState, repository: String) {
    let runtime = ensure_runtime_and_server(&feed_state.runtime, &feed_state.server)
        .expect("failed to create Tokio runtime");
    let server_url = feed_state
        .server
        .with_ref(MockServer::uri)
        .expect("mock server URL missing");
    let store = feed_state.store.get().expect("feed store missing");
    let target = FeedTarget::Repository(repository.trim_matches('"').to_owned());

    let (result, events) = runtime.block_on(async {
        let api_base = ApiBase::parse(&server_url)?;
        let gateway = OctocrabEventGateway::for_api_base(&api_base, None)?;
        let service = EventFeedService::builder(Arc::new(gateway), store).build();
        service.initialize().await?;

        let result = service.refresh_now(target).await;
        Ok::<_, FeedError>((result, service.current_events().await))
    })
    .expect("feed service should build");

    feed_state.events.set(events);
    match result {
        Ok(report) => {
            let _had_previous_error = feed_state.error.take().is_some();
            feed_state.report.set(report);
        }
        Err(error) => {
            let _had_previous_report = feed_state.report.take().is_some();
            feed_state.error.set(error);
        }
    }
}
