//! Gateways for loading repository activity through Octocrab.
//!
//! This module provides a trait-based gateway for communicating with the
//! GitHub API. The trait enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests.

mod client;
mod error_mapping;
mod events;
mod http_utils;

pub use events::OctocrabEventGateway;

use async_trait::async_trait;

use crate::github::error::FeedError;
use crate::github::locator::{DiscoveryQuery, RepositoryIdentifier};
use crate::github::models::{DecodedEvents, FetchMarker};
use crate::github::rate_limit::RateLimitInfo;

/// Whether a conditional events request produced new content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx: events decoded from the body (possibly none).
    Modified(DecodedEvents),
    /// 3xx: the server has nothing newer than the marker.
    NotModified,
}

/// Result of one events-list request that GitHub answered with 2xx or 3xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsResponse {
    /// Body classification.
    pub outcome: FetchOutcome,
    /// Fresh `Last-Modified` value, when the response carried one.
    pub marker: Option<FetchMarker>,
    /// Quota state reported alongside the response.
    pub rate_limit: Option<RateLimitInfo>,
}

/// Gateway that can list repository events and discover repositories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventGateway: Send + Sync {
    /// Fetch the most recent events for `repository`, sending `marker` as
    /// `If-Modified-Since` when present.
    ///
    /// Statuses outside 2xx/3xx and transport failures are errors.
    async fn repository_events(
        &self,
        repository: &RepositoryIdentifier,
        page_size: u8,
        marker: Option<FetchMarker>,
    ) -> Result<EventsResponse, FeedError>;

    /// Search for repositories matching `query`, at most `query.limit()`.
    async fn discover_repositories(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<Vec<RepositoryIdentifier>, FeedError>;
}
