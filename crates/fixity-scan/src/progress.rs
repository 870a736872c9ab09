//! Scan progress reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Snapshot published while the tree is being enumerated.
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    /// Regular files encountered so far.
    pub files_seen: u64,
    /// Files that passed the filter chain so far.
    pub files_selected: u64,
    /// Most recently visited path.
    pub current_path: PathBuf,
    /// Warnings recorded so far.
    pub warnings: u64,
    /// Time since the scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Enumeration rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_seen as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Files rejected by the filter chain so far.
    pub fn files_skipped(&self) -> u64 {
        self.files_seen.saturating_sub(self.files_selected)
    }
}
