//! Error types for configuration and scanning.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling a verification run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Mode code outside of the supported `1..=5` menu.
    #[error("Invalid scan mode: {code} (expected 1-5)")]
    InvalidMode { code: String },

    /// Sampling divisor must be at least one.
    #[error("Sampling divisor must be at least 1")]
    ZeroSampleDivisor,

    /// Glob pattern could not be compiled.
    #[error("Invalid ignore pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Errors that abort a directory scan before enumeration starts.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a directory entry.
    ReadError,
    /// Error reading metadata.
    MetadataError,
    /// Followed link resolves to a file the walk already covers; dropped.
    AliasedFile,
}

/// Non-fatal problem encountered while walking the tree.
///
/// Warnings never abort a scan; siblings of the failing entry are still
/// enumerated and the warning is carried into the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning from an I/O error, classifying permission failures.
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            Self {
                message: format!("Permission denied: {}", path.display()),
                path,
                kind: WarningKind::PermissionDenied,
            }
        } else {
            Self {
                message: format!("Read error: {error}"),
                path,
                kind: WarningKind::ReadError,
            }
        }
    }

    /// Create a warning for a link whose target is verified under another path.
    pub fn aliased(path: impl Into<PathBuf>, target: &std::path::Path) -> Self {
        Self {
            message: format!("Link target already covered as {}", target.display()),
            path: path.into(),
            kind: WarningKind::AliasedFile,
        }
    }
}
