//! GitFeed library crate providing a cached GitHub repository event feed.
//!
//! The library wraps Octocrab to poll a repository's public events with
//! conditional `If-Modified-Since` requests, keeps the newest events in a
//! bounded cache persisted under the user's cache directory, and reports
//! each refresh to an observer.

pub mod config;
pub mod feed;
pub mod github;
pub mod persistence;
pub mod telemetry;

pub use config::GitFeedConfig;
pub use feed::{
    DuplicatePolicy, EventFeedService, FeedObserver, FeedOptions, FeedTarget, LoadSummary,
    RefreshReport,
};
pub use github::{
    Event, EventGateway, FeedError, FetchMarker, OctocrabEventGateway, RepositoryIdentifier,
};
pub use persistence::{FeedStore, PersistenceError};
