//! Error types for local persistence operations.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors returned while reading or writing the on-disk feed state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// The cache directory was present but blank.
    #[error("cache directory must not be blank")]
    BlankDirectory,

    /// Neither `XDG_CACHE_HOME` nor `HOME` is available to derive a default
    /// cache directory.
    #[error("cache directory is required (use --cache-dir or GITFEED_CACHE_DIR)")]
    MissingDirectory,

    /// Reading a state file failed.
    #[error("failed to read '{path}': {message}")]
    ReadFailed {
        /// File that could not be read.
        path: Utf8PathBuf,
        /// Error detail from the filesystem.
        message: String,
    },

    /// Writing a state file failed.
    #[error("failed to write '{path}': {message}")]
    WriteFailed {
        /// File that could not be written.
        path: Utf8PathBuf,
        /// Error detail from the filesystem or encoder.
        message: String,
    },

    /// A state file exists but does not decode.
    #[error("'{path}' is corrupt: {message}")]
    Corrupt {
        /// File that failed to decode.
        path: Utf8PathBuf,
        /// Decoder error detail.
        message: String,
    },

    /// The cache file was written by an incompatible format version.
    #[error("'{path}' uses unsupported cache format version {version}")]
    UnsupportedVersion {
        /// File carrying the unknown version.
        path: Utf8PathBuf,
        /// Version number found in the file.
        version: u32,
    },

    /// The blocking filesystem task was cancelled or panicked.
    #[error("filesystem task did not complete: {message}")]
    TaskFailed {
        /// Join error detail.
        message: String,
    },
}

impl From<PersistenceError> for crate::github::error::FeedError {
    fn from(error: PersistenceError) -> Self {
        Self::Persistence {
            message: error.to_string(),
        }
    }
}
