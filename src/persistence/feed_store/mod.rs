//! File-backed store for cached events and the fetch marker.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};

use crate::github::models::{Event, FetchMarker};

use super::PersistenceError;

/// File holding the JSON cache envelope.
pub const EVENTS_FILE_NAME: &str = "events.json";

/// File holding the raw `Last-Modified` token.
pub const MARKER_FILE_NAME: &str = "modified.txt";

/// Version written into new cache envelopes.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct CacheEnvelopeRef<'a> {
    version: u32,
    events: &'a [Event],
}

#[derive(Deserialize)]
struct CacheEnvelope {
    version: u32,
    #[serde(default)]
    events: Vec<Event>,
}

/// Durable home of the feed state.
///
/// Loads report a missing file as `Ok(None)` so callers can tell "never
/// saved" apart from "saved but unreadable".
#[derive(Debug, Clone)]
pub struct FeedStore {
    directory: Utf8PathBuf,
}

impl FeedStore {
    /// Creates a store rooted at `directory`. The directory is created
    /// lazily on the first save.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDirectory`] when the path is blank.
    pub fn new(directory: impl Into<Utf8PathBuf>) -> Result<Self, PersistenceError> {
        let directory_path = directory.into();
        if directory_path.as_str().trim().is_empty() {
            return Err(PersistenceError::BlankDirectory);
        }
        Ok(Self {
            directory: directory_path,
        })
    }

    /// Directory holding the state files.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Full path of the cache file.
    #[must_use]
    pub fn events_path(&self) -> Utf8PathBuf {
        self.directory.join(EVENTS_FILE_NAME)
    }

    /// Full path of the marker file.
    #[must_use]
    pub fn marker_path(&self) -> Utf8PathBuf {
        self.directory.join(MARKER_FILE_NAME)
    }

    /// Reads the cached events.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::ReadFailed`] on I/O failure,
    /// [`PersistenceError::Corrupt`] when the file does not decode, and
    /// [`PersistenceError::UnsupportedVersion`] for unknown envelopes.
    pub fn load_events(&self) -> Result<Option<Vec<Event>>, PersistenceError> {
        let path = self.events_path();
        let Some(content) = self.read_optional(EVENTS_FILE_NAME, &path)? else {
            return Ok(None);
        };
        decode_events(&content, &path).map(Some)
    }

    /// Replaces the cached events on disk.
    ///
    /// The envelope is written to a temporary sibling and renamed over the
    /// cache file, so a crash mid-write leaves the previous cache intact.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::WriteFailed`] when encoding, writing, or
    /// renaming fails.
    pub fn save_events(&self, events: &[Event]) -> Result<(), PersistenceError> {
        let path = self.events_path();
        let content = encode_events(events).map_err(|error| PersistenceError::WriteFailed {
            path: path.clone(),
            message: error.to_string(),
        })?;
        self.write_atomically(EVENTS_FILE_NAME, &path, &content)
    }

    /// Reads the stored fetch marker. A blank file counts as no marker.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::ReadFailed`] on I/O failure.
    pub fn load_marker(&self) -> Result<Option<FetchMarker>, PersistenceError> {
        let path = self.marker_path();
        let content = self.read_optional(MARKER_FILE_NAME, &path)?;
        Ok(content.and_then(|token| FetchMarker::new(token).ok()))
    }

    /// Replaces the stored fetch marker.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::WriteFailed`] when the write fails.
    pub fn save_marker(&self, marker: &FetchMarker) -> Result<(), PersistenceError> {
        let path = self.marker_path();
        self.write_atomically(MARKER_FILE_NAME, &path, marker.as_str())
    }

    fn read_optional(
        &self,
        file_name: &str,
        path: &Utf8Path,
    ) -> Result<Option<String>, PersistenceError> {
        let read_failed = |error: &io::Error| PersistenceError::ReadFailed {
            path: path.to_path_buf(),
            message: error.to_string(),
        };

        let dir = match Dir::open_ambient_dir(&self.directory, ambient_authority()) {
            Ok(dir) => dir,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(read_failed(&error)),
        };

        match dir.read_to_string(file_name) {
            Ok(content) => Ok(Some(content)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(read_failed(&error)),
        }
    }

    fn write_atomically(
        &self,
        file_name: &str,
        path: &Utf8Path,
        content: &str,
    ) -> Result<(), PersistenceError> {
        let write_failed = |error: io::Error| PersistenceError::WriteFailed {
            path: path.to_path_buf(),
            message: error.to_string(),
        };

        Dir::create_ambient_dir_all(&self.directory, ambient_authority())
            .map_err(write_failed)?;
        let dir =
            Dir::open_ambient_dir(&self.directory, ambient_authority()).map_err(write_failed)?;

        let temp_name = format!(".{file_name}.tmp");
        dir.write(&temp_name, content).map_err(write_failed)?;
        dir.rename(&temp_name, &dir, file_name).map_err(write_failed)
    }
}

/// Serialises events into the versioned cache envelope.
///
/// # Errors
///
/// Returns the encoder error; in practice only non-string map keys fail,
/// which `Event` does not have.
pub(crate) fn encode_events(events: &[Event]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&CacheEnvelopeRef {
        version: CACHE_FORMAT_VERSION,
        events,
    })
}

fn decode_events(content: &str, path: &Utf8Path) -> Result<Vec<Event>, PersistenceError> {
    let envelope: CacheEnvelope =
        serde_json::from_str(content).map_err(|error| PersistenceError::Corrupt {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    if envelope.version != CACHE_FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: envelope.version,
        });
    }
    Ok(envelope.events)
}
