//! Error types exposed by the GitHub event feed layer.

use thiserror::Error;

use super::rate_limit::RateLimitInfo;

/// Errors surfaced while configuring the feed or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The repository identifier or another setting is unusable.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub answered with a status outside the 2xx/3xx range.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Rate limit exceeded: the API returned 403/429 with a rate limit message.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Rate limit info if available from response headers.
        rate_limit: Option<RateLimitInfo>,
        /// Error message from GitHub.
        message: String,
    },

    /// Networking failed or timed out while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response payload could not be decoded.
    #[error("could not decode response: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// Reading or writing the on-disk feed state failed.
    #[error("persistence error: {message}")]
    Persistence {
        /// Error detail from the store.
        message: String,
    },

    /// A refresh was requested while another one is still running.
    #[error("a refresh is already in progress")]
    RefreshInProgress,

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}
