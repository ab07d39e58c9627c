//! Rate limit information from GitHub API responses.
//!
//! GitHub reports quota state in `X-RateLimit-*` headers on every response,
//! including the 403/429 answers sent once the quota is gone. Anonymous
//! clients only get 60 requests an hour, so a polling feed hits this quickly.

use std::time::{SystemTime, UNIX_EPOCH};

use http::HeaderMap;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate limit information extracted from GitHub API response headers.
///
/// # Example
///
/// ```
/// use gitfeed::github::rate_limit::RateLimitInfo;
///
/// let info = RateLimitInfo::new(60, 59, 1700000000);
/// assert!(!info.is_exhausted());
/// assert_eq!(info.remaining(), 59);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    limit: u32,
    remaining: u32,
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit info instance.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Reads the `X-RateLimit-*` headers, returning `None` unless all three
    /// are present and numeric.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| raw.trim().parse::<u64>().ok())
        };

        let limit = u32::try_from(number(LIMIT_HEADER)?).ok()?;
        let remaining = u32::try_from(number(REMAINING_HEADER)?).ok()?;
        let reset_at = number(RESET_HEADER)?;
        Some(Self::new(limit, remaining, reset_at))
    }

    /// Returns the maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns the Unix timestamp when the rate limit resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Returns true if the rate limit has been exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Calculates seconds until the rate limit resets.
    ///
    /// Returns 0 if the reset time has already passed or if the system time
    /// cannot be determined.
    #[must_use]
    pub fn seconds_until_reset(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);

        self.reset_at.saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use http::{HeaderMap, HeaderValue};
    use rstest::rstest;

    use super::RateLimitInfo;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[rstest]
    fn parses_complete_rate_limit_headers() {
        let map = headers(&[
            ("x-ratelimit-limit", "60"),
            ("x-ratelimit-remaining", "0"),
            ("x-ratelimit-reset", "1700000000"),
        ]);

        let info = RateLimitInfo::from_headers(&map).expect("headers should parse");

        assert_eq!(info, RateLimitInfo::new(60, 0, 1_700_000_000));
        assert!(info.is_exhausted());
    }

    #[rstest]
    #[case::missing_reset(&[("x-ratelimit-limit", "60"), ("x-ratelimit-remaining", "1")])]
    #[case::non_numeric(&[
        ("x-ratelimit-limit", "sixty"),
        ("x-ratelimit-remaining", "1"),
        ("x-ratelimit-reset", "1"),
    ])]
    fn incomplete_headers_yield_none(#[case] pairs: &[(&'static str, &'static str)]) {
        assert_eq!(RateLimitInfo::from_headers(&headers(pairs)), None);
    }

    #[rstest]
    fn seconds_until_reset_returns_zero_when_reset_has_passed() {
        let info = RateLimitInfo::new(60, 0, 0);
        assert_eq!(info.seconds_until_reset(), 0);
    }

    #[rstest]
    fn seconds_until_reset_counts_down_to_future_reset() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after the epoch")
            .as_secs();
        let info = RateLimitInfo::new(60, 0, now + 600);

        let wait = info.seconds_until_reset();

        assert!((590..=600).contains(&wait), "unexpected wait {wait}");
        assert_eq!(info.limit(), 60);
        assert_eq!(info.reset_at(), now + 600);
    }
}
