//! Checksum store errors.

use compact_str::CompactString;
use thiserror::Error;

/// Errors raised by [`ChecksumStore`](crate::ChecksumStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file could not be opened or the schema could not be created.
    /// Fatal for the run.
    #[error("Failed to initialize checksum store at {location}: {source}")]
    Init {
        location: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Lookup failed for a reason other than "not found".
    #[error("Checksum lookup failed for {path}: {source}")]
    Query {
        path: CompactString,
        #[source]
        source: rusqlite::Error,
    },

    /// Insert or update failed.
    #[error("Checksum write failed for {path}: {source}")]
    Write {
        path: CompactString,
        #[source]
        source: rusqlite::Error,
    },

    /// Update targeted a path the store does not track.
    #[error("No tracked record for {path}")]
    NotTracked { path: CompactString },

    /// A thread panicked while holding the store lock.
    #[error("Checksum store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Whether the error prevents any further use of the store.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Init { .. } | Self::LockPoisoned)
    }
}
