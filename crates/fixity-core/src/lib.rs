//! Core types and configuration for fixity.
//!
//! This crate provides the data model shared by the scanning, storage and
//! verification crates: file records, per-file outcomes, scan modes, run
//! summaries and the verification configuration.

mod config;
mod error;
mod mode;
mod record;
mod summary;

pub use config::{
    DEFAULT_LOG_FILE_NAME, DEFAULT_QUEUE_CAPACITY, DEFAULT_STORE_FILE_NAME, DEFAULT_WORKERS,
    VerifyConfig, VerifyConfigBuilder,
};
pub use error::{ConfigError, ScanError, ScanWarning, WarningKind};
pub use mode::ScanMode;
pub use record::{FileRecord, Fingerprint, MtimeMarker, OpStatus, ResultRecord};
pub use summary::{RunSummary, StatusCounts, round_secs};
