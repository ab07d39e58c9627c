//! Local persistence for the event cache and conditional-fetch marker.
//!
//! State lives in two small files inside one cache directory: a versioned
//! JSON envelope holding the cached events and a plain-text marker file
//! holding the last `Last-Modified` token. Both are rewritten in full on
//! every save.

mod error;
mod feed_store;

use camino::Utf8PathBuf;

pub use error::PersistenceError;
pub use feed_store::{CACHE_FORMAT_VERSION, EVENTS_FILE_NAME, FeedStore, MARKER_FILE_NAME};

/// Returns the default cache directory, `$XDG_CACHE_HOME/gitfeed` or
/// `$HOME/.cache/gitfeed`.
///
/// # Errors
///
/// Returns [`PersistenceError::MissingDirectory`] when neither variable is
/// set to a non-empty value.
pub fn default_cache_dir() -> Result<Utf8PathBuf, PersistenceError> {
    let xdg = std::env::var("XDG_CACHE_HOME")
        .ok()
        .filter(|v| !v.is_empty());
    let home = std::env::var("HOME").ok().filter(|v| !v.is_empty());

    resolve_cache_dir(xdg.as_deref(), home.as_deref())
}

/// Resolves the cache root from optional environment values.
pub(crate) fn resolve_cache_dir(
    xdg_cache_home: Option<&str>,
    home: Option<&str>,
) -> Result<Utf8PathBuf, PersistenceError> {
    if let Some(cache_home) = xdg_cache_home {
        return Ok(Utf8PathBuf::from(cache_home).join("gitfeed"));
    }

    if let Some(home_dir) = home {
        return Ok(Utf8PathBuf::from(home_dir).join(".cache").join("gitfeed"));
    }

    Err(PersistenceError::MissingDirectory)
}
