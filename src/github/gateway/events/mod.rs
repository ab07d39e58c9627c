//! Octocrab gateway for repository events and repository discovery.

use async_trait::async_trait;
use http::Uri;
use http::header::LAST_MODIFIED;
use octocrab::Octocrab;

use crate::github::error::FeedError;
use crate::github::locator::{ApiBase, DiscoveryQuery, PersonalAccessToken, RepositoryIdentifier};
use crate::github::models::{ApiSearchResponse, FetchMarker, decode_event_list};
use crate::github::rate_limit::RateLimitInfo;

use super::client::build_octocrab_client;
use super::error_mapping::{map_http_error, map_octocrab_error};
use super::http_utils::{
    StatusClass, build_conditional_headers, classify_status, extract_github_message,
    header_to_string,
};
use super::{EventGateway, EventsResponse, FetchOutcome};

/// Octocrab-backed gateway for the events and search endpoints.
///
/// Requests go through `_get_with_headers` rather than Octocrab's typed
/// helpers because the feed needs the raw status and `Last-Modified` header.
pub struct OctocrabEventGateway {
    client: Octocrab,
}

impl OctocrabEventGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a gateway talking to `api_base`, authenticated when a token is
    /// supplied.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::InvalidUrl` when the base URI cannot be parsed or
    /// `FeedError::Api` when Octocrab fails to construct a client.
    pub fn for_api_base(
        api_base: &ApiBase,
        token: Option<&PersonalAccessToken>,
    ) -> Result<Self, FeedError> {
        let octocrab = build_octocrab_client(token, api_base)?;
        Ok(Self::new(octocrab))
    }
}

fn parse_uri(path: &str) -> Result<Uri, FeedError> {
    path.parse::<Uri>()
        .map_err(|error| FeedError::InvalidUrl(error.to_string()))
}

#[async_trait]
impl EventGateway for OctocrabEventGateway {
    async fn repository_events(
        &self,
        repository: &RepositoryIdentifier,
        page_size: u8,
        marker: Option<FetchMarker>,
    ) -> Result<EventsResponse, FeedError> {
        let uri = parse_uri(&repository.events_path(page_size))?;
        let headers = build_conditional_headers(marker.as_ref());

        let response = self
            .client
            ._get_with_headers(uri, headers)
            .await
            .map_err(|error| map_octocrab_error("repository events", &error))?;

        let status = response.status();
        let class = classify_status(status);
        let rate_limit = RateLimitInfo::from_headers(response.headers());

        if class == StatusClass::Failure {
            let body = self
                .client
                .body_to_string(response)
                .await
                .unwrap_or_else(|_| String::new());
            return Err(map_http_error(
                "repository events",
                status,
                extract_github_message(&body),
                rate_limit,
            ));
        }

        let fresh_marker = header_to_string(response.headers().get(LAST_MODIFIED))
            .and_then(|token| FetchMarker::new(token).ok());

        let outcome = if class == StatusClass::Success {
            let body = self
                .client
                .body_to_string(response)
                .await
                .map_err(|error| FeedError::Network {
                    message: format!("reading events for {repository} failed: {error}"),
                })?;
            FetchOutcome::Modified(decode_event_list(&body))
        } else {
            tracing::debug!(%repository, %status, "events not modified since marker");
            FetchOutcome::NotModified
        };

        Ok(EventsResponse {
            outcome,
            marker: fresh_marker,
            rate_limit,
        })
    }

    async fn discover_repositories(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<Vec<RepositoryIdentifier>, FeedError> {
        let uri = parse_uri(&query.search_path())?;

        let response = self
            .client
            ._get_with_headers(uri, None)
            .await
            .map_err(|error| map_octocrab_error("repository search", &error))?;

        let status = response.status();
        let rate_limit = RateLimitInfo::from_headers(response.headers());
        let read = self.client.body_to_string(response).await;

        if classify_status(status) != StatusClass::Success {
            let body = read.unwrap_or_else(|_| String::new());
            return Err(map_http_error(
                "repository search",
                status,
                extract_github_message(&body),
                rate_limit,
            ));
        }

        let body = read.map_err(|error| FeedError::Network {
            message: format!("reading repository search failed: {error}"),
        })?;

        let search = ApiSearchResponse::from_body(&body)?;

        let repositories = search
            .items
            .into_iter()
            .filter_map(|item| match RepositoryIdentifier::parse(&item.full_name) {
                Ok(repository) => Some(repository),
                Err(error) => {
                    tracing::warn!("ignoring search result {}: {error}", item.full_name);
                    None
                }
            })
            .take(usize::from(query.limit()))
            .collect();

        Ok(repositories)
    }
}
