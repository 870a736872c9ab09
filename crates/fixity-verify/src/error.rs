//! Verification errors.

use std::path::PathBuf;

use thiserror::Error;

use fixity_core::{ConfigError, ScanError};
use fixity_store::StoreError;

/// Errors raised while verifying a file or running the pipeline.
///
/// `Hash`, `Stat`, `Path` and `Store` are per-file and end up as
/// [`OpStatus::Error`](fixity_core::OpStatus::Error) results. The rest abort
/// the run.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// File could not be opened or read while fingerprinting.
    #[error("Failed to hash {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Modification time could not be read.
    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File does not live under the scan root.
    #[error("{path} is not under {root}")]
    Path { path: PathBuf, root: PathBuf },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run log could not be written or read.
    #[error("Run log error at {path}: {source}")]
    Journal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run log line is not a valid summary.
    #[error("Malformed run log entry at {path} line {line}: {source}")]
    JournalEntry {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode run summary: {0}")]
    Encode(#[from] serde_json::Error),

    /// A pipeline thread panicked.
    #[error("Pipeline thread panicked: {0}")]
    Panicked(&'static str),
}

impl VerifyError {
    /// Whether the error only affects a single file.
    pub fn is_per_file(&self) -> bool {
        match self {
            Self::Hash { .. } | Self::Stat { .. } | Self::Path { .. } => true,
            Self::Store(err) => !err.is_fatal(),
            _ => false,
        }
    }
}
