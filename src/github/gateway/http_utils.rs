//! Shared HTTP utilities for gateway implementations.

use http::header::{HeaderMap, HeaderValue, IF_MODIFIED_SINCE};
use http::StatusCode;

use crate::github::models::FetchMarker;

/// How the feed treats a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatusClass {
    /// 2xx: the body carries events.
    Success,
    /// 3xx (normally 304): nothing new, but validators still apply.
    NotModified,
    /// Anything else aborts the fetch for this repository.
    Failure,
}

pub(super) fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Success
    } else if status.is_redirection() {
        StatusClass::NotModified
    } else {
        StatusClass::Failure
    }
}

pub(super) fn build_conditional_headers(marker: Option<&FetchMarker>) -> Option<HeaderMap> {
    let value = marker.and_then(|token| HeaderValue::from_str(token.as_str()).ok())?;
    let mut headers = HeaderMap::new();
    headers.insert(IF_MODIFIED_SINCE, value);
    Some(headers)
}

pub(super) fn header_to_string(header_value: Option<&HeaderValue>) -> Option<String> {
    header_value
        .and_then(|raw| raw.to_str().ok())
        .map(ToOwned::to_owned)
}

pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}
