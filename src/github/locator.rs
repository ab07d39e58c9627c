//! Repository identifiers, API base URLs, and token wrappers.

use std::fmt;

use url::Url;

use super::error::FeedError;

/// Public GitHub REST API root used when no override is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

fn invalid_identifier(input: &str, reason: &str) -> FeedError {
    FeedError::Configuration {
        message: format!("invalid repository identifier '{input}': {reason}"),
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated `owner/name` pair naming a GitHub repository.
///
/// # Example
///
/// ```
/// use gitfeed::github::RepositoryIdentifier;
///
/// let repo = RepositoryIdentifier::parse("ReactiveX/RxSwift")
///     .expect("should parse identifier");
/// assert_eq!(repo.owner().as_str(), "ReactiveX");
/// assert_eq!(repo.name().as_str(), "RxSwift");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentifier {
    owner: RepositoryOwner,
    name: RepositoryName,
}

impl RepositoryIdentifier {
    /// Parses `owner/name`, also accepting a `https://github.com/owner/name`
    /// URL. Surrounding whitespace and a trailing `.git` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] when the input does not contain
    /// exactly two valid path segments.
    pub fn parse(input: &str) -> Result<Self, FeedError> {
        let trimmed = input.trim();
        let raw_path = match Url::parse(trimmed) {
            Ok(parsed) if parsed.has_host() => parsed.path().to_owned(),
            _ => trimmed.to_owned(),
        };
        let unslashed = raw_path.trim_matches('/');
        let slug = unslashed.strip_suffix(".git").unwrap_or(unslashed);

        let mut segments = slug.split('/');
        let (Some(owner), Some(name), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(invalid_identifier(input, "expected owner/name"));
        };

        if !is_valid_segment(owner) {
            return Err(invalid_identifier(input, "owner is empty or malformed"));
        }
        if !is_valid_segment(name) {
            return Err(invalid_identifier(input, "name is empty or malformed"));
        }

        Ok(Self {
            owner: RepositoryOwner(owner.to_owned()),
            name: RepositoryName(name.to_owned()),
        })
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn name(&self) -> &RepositoryName {
        &self.name
    }

    /// Returns the API path for listing the repository's recent events.
    pub(crate) fn events_path(&self, per_page: u8) -> String {
        format!(
            "/repos/{}/{}/events?per_page={per_page}",
            self.owner.as_str(),
            self.name.as_str()
        )
    }
}

impl fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner.as_str(), self.name.as_str())
    }
}

/// Root URL of the GitHub REST API the gateway talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(Url);

impl ApiBase {
    /// Parses an API base URL such as `https://api.github.com` or a GitHub
    /// Enterprise `https://ghe.example.com/api/v3`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidUrl`] when the input is not an absolute
    /// `http`/`https` URL.
    pub fn parse(input: &str) -> Result<Self, FeedError> {
        let parsed =
            Url::parse(input.trim()).map_err(|error| FeedError::InvalidUrl(error.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(FeedError::InvalidUrl(format!(
                "API base must be an http(s) URL with a host: {input}"
            )));
        }
        Ok(Self(parsed))
    }

    /// Borrow the parsed URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }

    /// Borrow the URL as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, FeedError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(FeedError::Configuration {
                message: "personal access token must not be blank".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Largest number of repositories a discovery search may contribute.
pub const MAX_DISCOVERED_REPOSITORIES: u8 = 5;

/// Repository search used to pick feed candidates by language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryQuery {
    language: String,
    limit: u8,
}

impl DiscoveryQuery {
    /// Creates a query for repositories written in `language`.
    ///
    /// `limit` is clamped to `1..=MAX_DISCOVERED_REPOSITORIES`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] when the language is blank.
    pub fn new(language: &str, limit: u8) -> Result<Self, FeedError> {
        let trimmed = language.trim();
        if trimmed.is_empty() {
            return Err(FeedError::Configuration {
                message: "discovery language must not be blank".to_owned(),
            });
        }
        Ok(Self {
            language: trimmed.to_owned(),
            limit: limit.clamp(1, MAX_DISCOVERED_REPOSITORIES),
        })
    }

    /// Language filter.
    #[must_use]
    pub const fn language(&self) -> &str {
        self.language.as_str()
    }

    /// Maximum number of repositories to return.
    #[must_use]
    pub const fn limit(&self) -> u8 {
        self.limit
    }

    /// Returns the API path (with encoded query) for the search request.
    pub(crate) fn search_path(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &format!("language:{}", self.language))
            .append_pair("per_page", &self.limit.to_string())
            .finish();
        format!("/search/repositories?{query}")
    }
}
