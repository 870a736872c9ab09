//! Run tallies and the persisted run summary.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;
use crate::mode::ScanMode;
use crate::record::OpStatus;

/// Per-status counters for one run.
///
/// Plain increments only, so totals do not depend on result arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub added: u64,
    pub modified: u64,
    pub corrupted: u64,
    pub unchanged: u64,
    pub errors: u64,
}

impl StatusCounts {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome.
    pub fn record(&mut self, status: OpStatus) {
        match status {
            OpStatus::Added => self.added += 1,
            OpStatus::Modified => self.modified += 1,
            OpStatus::Corrupted => self.corrupted += 1,
            OpStatus::Unchanged => self.unchanged += 1,
            OpStatus::Error => self.errors += 1,
        }
    }

    /// Count for a single status.
    pub fn get(&self, status: OpStatus) -> u64 {
        match status {
            OpStatus::Added => self.added,
            OpStatus::Modified => self.modified,
            OpStatus::Corrupted => self.corrupted,
            OpStatus::Unchanged => self.unchanged,
            OpStatus::Error => self.errors,
        }
    }

    /// Sum of all outcomes.
    pub fn total(&self) -> u64 {
        self.added + self.modified + self.corrupted + self.unchanged + self.errors
    }
}

/// Durable summary of one verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Canonical root that was verified.
    pub root: PathBuf,
    /// Mode the run used.
    pub mode: ScanMode,
    /// Outcome tallies.
    pub counts: StatusCounts,
    /// Results consumed by the aggregator.
    pub total_processed: u64,
    /// Files that survived the filter chain.
    pub eligible: u64,
    /// Total bytes fingerprinted.
    #[serde(default)]
    pub bytes_hashed: u64,
    /// Wall-clock duration, rounded to two decimals.
    pub elapsed_secs: f64,
    /// When the run completed.
    pub finished_at: DateTime<Utc>,
    /// Every path classified as corrupted, sorted.
    pub corrupted_paths: Vec<CompactString>,
    /// Every path that failed to process, sorted.
    #[serde(default)]
    pub failed_paths: Vec<CompactString>,
    /// Non-fatal problems from the directory walk.
    #[serde(default)]
    pub scan_warnings: Vec<ScanWarning>,
}

impl RunSummary {
    /// Check if the run detected any corruption.
    pub fn has_corruption(&self) -> bool {
        self.counts.corrupted > 0
    }

    /// Check that every eligible file produced exactly one result.
    pub fn is_complete(&self) -> bool {
        self.total_processed == self.eligible && self.counts.total() == self.total_processed
    }
}

/// Round a duration to seconds with two decimals.
pub fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}
