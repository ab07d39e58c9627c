//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.gitfeed.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `GITFEED_REPO`, `GITFEED_TOKEN`, or legacy
//!    `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--repo`/`-r` and `--token`/`-t`
//!
//! # Configuration File
//!
//! ```toml
//! repo = "ReactiveX/RxSwift"
//! token = "ghp_example"
//! cache_dir = "/home/octocat/.cache/gitfeed"
//! per_page = 5
//! max_cached_events = 25
//! dedupe_events = true
//! ```

use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::feed::{DuplicatePolicy, FeedOptions, FeedTarget};
use crate::github::error::FeedError;
use crate::github::locator::{ApiBase, DEFAULT_API_BASE, DiscoveryQuery, PersonalAccessToken};
use crate::persistence::default_cache_dir;

/// Repository followed when none is configured.
pub const DEFAULT_REPOSITORY: &str = "ReactiveX/RxSwift";

const DEFAULT_PER_PAGE: u8 = 5;
const MAX_PER_PAGE: u8 = 100;
const DEFAULT_MAX_CACHED_EVENTS: usize = 25;
const DEFAULT_DISCOVER_LIMIT: u8 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `GITFEED_REPO` or `--repo`: Repository to follow
/// - `GITFEED_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `GITFEED_CACHE_DIR` or `--cache-dir`: Directory for cached state
/// - `GITFEED_DISCOVER_LANGUAGE` or `--discover-language`: Follow the top
///   repositories for a language instead of `repo`
///
/// # Example
///
/// ```no_run
/// use gitfeed::GitFeedConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = GitFeedConfig::load().expect("failed to load configuration");
/// let target = config.feed_target().expect("target should resolve");
/// let options = config.feed_options().expect("options should validate");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "GITFEED",
    discovery(
        dotfile_name = ".gitfeed.toml",
        config_file_name = "gitfeed.toml",
        app_name = "gitfeed"
    )
)]
pub struct GitFeedConfig {
    /// Repository to follow, as `owner/name` or a GitHub URL.
    ///
    /// Can be provided via:
    /// - CLI: `--repo <REPO>` or `-r <REPO>`
    /// - Environment: `GITFEED_REPO`
    /// - Config file: `repo = "..."`
    ///
    /// Defaults to `ReactiveX/RxSwift`.
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Personal access token for GitHub API authentication.
    ///
    /// Optional: public repositories can be read anonymously at a lower rate
    /// limit.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `GITFEED_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// GitHub API root. Defaults to `https://api.github.com`.
    #[ortho_config()]
    pub api_base: Option<String>,

    /// Directory holding `events.json` and `modified.txt`.
    ///
    /// Defaults to `$XDG_CACHE_HOME/gitfeed` or `$HOME/.cache/gitfeed`.
    #[ortho_config(cli_short = 'c')]
    pub cache_dir: Option<String>,

    /// Events requested per repository, between 1 and 100.
    #[ortho_config()]
    pub per_page: u8,

    /// Number of events kept in the cache.
    #[ortho_config()]
    pub max_cached_events: usize,

    /// Language whose most starred repositories are followed instead of
    /// `repo`.
    #[ortho_config(cli_short = 'l')]
    pub discover_language: Option<String>,

    /// Number of repositories followed in discovery mode, clamped to 1..=5.
    #[ortho_config()]
    pub discover_limit: u8,

    /// Skips incoming events whose id is already cached.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment, so set this via `--dedupe-events` or the config file.
    #[ortho_config()]
    pub dedupe_events: bool,

    /// Upper bound on each GitHub request, in seconds.
    #[ortho_config()]
    pub request_timeout_seconds: u64,

    /// `tracing` level filter for the binary (`error` .. `trace`).
    #[ortho_config()]
    pub log_level: Option<String>,

    /// Writes refresh telemetry to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for GitFeedConfig {
    fn default() -> Self {
        Self {
            repo: None,
            token: None,
            api_base: None,
            cache_dir: None,
            per_page: DEFAULT_PER_PAGE,
            max_cached_events: DEFAULT_MAX_CACHED_EVENTS,
            discover_language: None,
            discover_limit: DEFAULT_DISCOVER_LIMIT,
            dedupe_events: false,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            log_level: None,
            telemetry: false,
        }
    }
}

impl GitFeedConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] only if a present token fails
    /// validation.
    pub fn resolve_token(&self) -> Result<Option<PersonalAccessToken>, FeedError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .filter(|value| !value.trim().is_empty())
            .map(PersonalAccessToken::new)
            .transpose()
    }

    /// Returns the configured repository or [`DEFAULT_REPOSITORY`].
    #[must_use]
    pub fn repository(&self) -> &str {
        self.repo.as_deref().unwrap_or(DEFAULT_REPOSITORY)
    }

    /// Parses the configured API root.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidUrl`] when `api_base` is not an HTTP(S) URL.
    pub fn api_base(&self) -> Result<ApiBase, FeedError> {
        ApiBase::parse(self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE))
    }

    /// Returns the configured cache directory or the platform default.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Persistence`] when no default can be derived.
    pub fn cache_dir(&self) -> Result<Utf8PathBuf, FeedError> {
        match self.cache_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => Ok(Utf8PathBuf::from(dir)),
            _ => Ok(default_cache_dir()?),
        }
    }

    /// Determines what each refresh fetches.
    ///
    /// A discovery language takes precedence over `repo`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] when the discovery language is
    /// blank.
    pub fn feed_target(&self) -> Result<FeedTarget, FeedError> {
        match self.discover_language.as_deref() {
            Some(language) => Ok(FeedTarget::Discover(DiscoveryQuery::new(
                language,
                self.discover_limit,
            )?)),
            None => Ok(FeedTarget::Repository(self.repository().to_owned())),
        }
    }

    /// Builds the refresh pipeline options.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] when `per_page`,
    /// `max_cached_events`, or `request_timeout_seconds` is out of range.
    pub fn feed_options(&self) -> Result<FeedOptions, FeedError> {
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(FeedError::Configuration {
                message: format!("per_page must be between 1 and {MAX_PER_PAGE}"),
            });
        }
        if self.max_cached_events == 0 {
            return Err(FeedError::Configuration {
                message: "max_cached_events must be at least 1".to_owned(),
            });
        }
        if self.request_timeout_seconds == 0 {
            return Err(FeedError::Configuration {
                message: "request_timeout_seconds must be at least 1".to_owned(),
            });
        }

        Ok(FeedOptions {
            page_size: self.per_page,
            max_cached_events: self.max_cached_events,
            duplicate_policy: DuplicatePolicy::from_flag(self.dedupe_events),
            request_timeout: Duration::from_secs(self.request_timeout_seconds),
        })
    }

    /// Returns the configured log level, defaulting to `info`.
    #[must_use]
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[cfg(test)]
mod tests;
