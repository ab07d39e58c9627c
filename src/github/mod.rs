//! GitHub repository activity: identifiers, wire models, and the gateway.
//!
//! This module wraps Octocrab to issue conditional event-list requests and
//! repository searches. Errors are mapped into `FeedError` variants so that
//! callers can surface precise failures without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod rate_limit;

pub use error::FeedError;
pub use gateway::{EventGateway, EventsResponse, FetchOutcome, OctocrabEventGateway};
pub use locator::{
    ApiBase, DiscoveryQuery, PersonalAccessToken, RepositoryIdentifier, RepositoryName,
    RepositoryOwner,
};
pub use models::{Actor, DecodedEvents, Event, FetchMarker};
pub use rate_limit::RateLimitInfo;

#[cfg(test)]
pub use gateway::MockEventGateway;
