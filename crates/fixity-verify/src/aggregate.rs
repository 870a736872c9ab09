//! Result aggregation and progress reporting.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use compact_str::CompactString;

use fixity_core::{
    OpStatus, ResultRecord, RunSummary, ScanMode, ScanWarning, StatusCounts, round_secs,
};

/// Receives progress while results are consumed.
///
/// Called from the aggregating thread only.
pub trait ProgressSink {
    /// Verification is about to start on `total` files.
    fn begin(&self, _total: u64) {}

    /// `increment` more results arrived; `message` describes the latest one.
    fn advance(&self, increment: u64, message: &str);

    /// All results have been consumed.
    fn finish(&self) {}
}

/// Sink that discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self, _increment: u64, _message: &str) {}
}

/// Single consumer of the result stream.
pub struct Aggregator<'a> {
    counts: StatusCounts,
    corrupted: Vec<CompactString>,
    failed: Vec<CompactString>,
    bytes_hashed: u64,
    progress: &'a dyn ProgressSink,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator reporting into `progress`.
    pub fn new(progress: &'a dyn ProgressSink) -> Self {
        Self {
            counts: StatusCounts::new(),
            corrupted: Vec::new(),
            failed: Vec::new(),
            bytes_hashed: 0,
            progress,
        }
    }

    /// Account for one result.
    pub fn record(&mut self, result: ResultRecord) {
        self.counts.record(result.status);
        self.bytes_hashed += result.bytes;

        match result.status {
            OpStatus::Corrupted => {
                tracing::warn!(path = %result.relative_path, "{}", result.message);
                self.corrupted.push(result.relative_path);
            }
            OpStatus::Error => {
                tracing::error!(path = %result.relative_path, "{}", result.message);
                self.failed.push(result.relative_path);
            }
            _ => {}
        }

        self.progress.advance(1, &result.message);
    }

    /// Results consumed so far.
    pub fn processed(&self) -> u64 {
        self.counts.total()
    }

    /// Current tallies.
    pub fn counts(&self) -> &StatusCounts {
        &self.counts
    }

    /// Build the run summary. Path lists are sorted so it is deterministic.
    pub fn finish(
        mut self,
        root: PathBuf,
        mode: ScanMode,
        eligible: u64,
        elapsed: Duration,
        scan_warnings: Vec<ScanWarning>,
    ) -> RunSummary {
        self.corrupted.sort_unstable();
        self.failed.sort_unstable();

        RunSummary {
            root,
            mode,
            counts: self.counts,
            total_processed: self.counts.total(),
            eligible,
            bytes_hashed: self.bytes_hashed,
            elapsed_secs: round_secs(elapsed),
            finished_at: Utc::now(),
            corrupted_paths: self.corrupted,
            failed_paths: self.failed,
            scan_warnings,
        }
    }
}
