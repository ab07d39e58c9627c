//! Octocrab client construction helpers for gateway implementations.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::FeedError;
use crate::github::locator::{ApiBase, PersonalAccessToken};

use super::error_mapping::map_octocrab_error;

/// Builds an Octocrab client for the given API base URL.
///
/// The events and search endpoints are public, so the token is optional;
/// supplying one raises the rate limit from 60 to 5000 requests an hour.
///
/// Octocrab spawns its service stack onto the current Tokio runtime, so this
/// must be called from within one.
///
/// # Errors
///
/// Returns `FeedError::InvalidUrl` when the base URI cannot be parsed or
/// `FeedError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: Option<&PersonalAccessToken>,
    api_base: &ApiBase,
) -> Result<Octocrab, FeedError> {
    let base_uri: Uri = api_base
        .as_str()
        .parse::<Uri>()
        .map_err(|error| FeedError::InvalidUrl(error.to_string()))?;

    let builder = match token {
        Some(personal) => Octocrab::builder().personal_token(personal.value()),
        None => Octocrab::builder(),
    };

    builder
        .base_uri(base_uri)
        .map_err(|error| FeedError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
