//! The event feed: bounded cache, refresh pipeline, and observer callbacks.
//!
//! [`EventFeedService`] owns the cached events and the conditional-fetch
//! marker. Each refresh resolves the target repositories, fetches their
//! events through an [`EventGateway`](crate::github::EventGateway), merges
//! new events in front of the cache, persists the result, and reports to a
//! [`FeedObserver`].

mod merge;
mod observer;
mod service;

pub use merge::{DuplicatePolicy, MergeResult, merge_events};
pub use observer::{FeedObserver, NoopFeedObserver};
pub use service::{
    DEFAULT_MAX_CACHED_EVENTS, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT, EventFeedService,
    EventFeedServiceBuilder, FeedOptions, FeedTarget, LoadSummary, RefreshReport,
};
