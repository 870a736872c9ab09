//! Stored file state and per-file verification outcomes.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// Hex-encoded content digest of a file.
///
/// Compared by exact string equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-encoded fingerprint, e.g. one read back from the store.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque modification-time marker.
///
/// Rendered as RFC 3339 UTC with nanosecond precision so that two edits in
/// the same second still produce different markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MtimeMarker(String);

impl MtimeMarker {
    /// Build the marker for a modification time.
    pub fn from_system_time(modified: SystemTime) -> Self {
        let utc: DateTime<Utc> = modified.into();
        Self(utc.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    /// Wrap a stored marker.
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    /// Get the marker string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MtimeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last-known-good state of one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the scan root, `/`-separated. Unique within a store.
    pub relative_path: CompactString,
    /// Content fingerprint at the time the record was written.
    pub fingerprint: Fingerprint,
    /// Modification-time marker at the time the record was written.
    pub mtime_marker: MtimeMarker,
}

impl FileRecord {
    /// Create a new record.
    pub fn new(
        relative_path: impl Into<CompactString>,
        fingerprint: Fingerprint,
        mtime_marker: MtimeMarker,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            fingerprint,
            mtime_marker,
        }
    }
}

/// Outcome of processing one file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OpStatus {
    /// Fingerprint and marker both match the store.
    Unchanged,
    /// Marker changed; the new content was accepted as the baseline.
    Modified,
    /// Content changed while the marker stayed the same.
    Corrupted,
    /// Path was not tracked yet and has been recorded.
    Added,
    /// The file could not be processed.
    Error,
}

/// Result emitted by a worker for a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Root-relative path, or the absolute path when it could not be made relative.
    pub relative_path: CompactString,
    /// Classification outcome.
    pub status: OpStatus,
    /// Human-readable status line.
    pub message: String,
    /// Bytes read while fingerprinting (0 on failure).
    #[serde(default)]
    pub bytes: u64,
}

impl ResultRecord {
    /// Create a result for a successfully classified file.
    pub fn new(relative_path: impl Into<CompactString>, status: OpStatus) -> Self {
        let relative_path = relative_path.into();
        let message = match status {
            OpStatus::Unchanged => format!("Verified: {relative_path}"),
            OpStatus::Modified => format!("Modified, fingerprint updated: {relative_path}"),
            OpStatus::Corrupted => format!("CORRUPTED: {relative_path}"),
            OpStatus::Added => format!("Now tracking: {relative_path}"),
            OpStatus::Error => format!("Failed: {relative_path}"),
        };
        Self {
            relative_path,
            status,
            message,
            bytes: 0,
        }
    }

    /// Attach the number of bytes hashed.
    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.bytes = bytes;
        self
    }

    /// Create an error result carrying the failure text.
    pub fn error(relative_path: impl Into<CompactString>, error: impl fmt::Display) -> Self {
        let relative_path = relative_path.into();
        Self {
            message: format!("Failed: {relative_path}: {error}"),
            relative_path,
            status: OpStatus::Error,
            bytes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_fingerprint_equality_is_exact() {
        let fp = Fingerprint::from_hex("ab01ff");
        assert_eq!(fp.as_str(), "ab01ff");
        assert_eq!(fp, Fingerprint::from_hex("ab01ff"));
        assert_ne!(fp, Fingerprint::from_hex("AB01FF"));
    }

    #[test]
    fn test_mtime_marker_keeps_nanoseconds() {
        let a = UNIX_EPOCH + Duration::new(1_700_000_000, 1);
        let b = UNIX_EPOCH + Duration::new(1_700_000_000, 2);

        let marker = MtimeMarker::from_system_time(a);
        assert_eq!(marker.as_str(), "2023-11-14T22:13:20.000000001Z");
        assert_ne!(marker, MtimeMarker::from_system_time(b));
        assert_eq!(marker, MtimeMarker::from_system_time(a));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(OpStatus::Corrupted.to_string(), "corrupted");
        assert_eq!(OpStatus::Added.as_ref(), "added");
    }

    #[test]
    fn test_result_messages() {
        let result = ResultRecord::new("a/b.txt", OpStatus::Corrupted);
        assert_eq!(result.status, OpStatus::Corrupted);
        assert_eq!(result.message, "CORRUPTED: a/b.txt");

        let failed = ResultRecord::error("/abs/c.txt", "permission denied");
        assert_eq!(failed.status, OpStatus::Error);
        assert!(failed.message.contains("permission denied"));
    }
}
