//! Verification run configuration.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::mode::ScanMode;

/// Store file created inside each verified root.
pub const DEFAULT_STORE_FILE_NAME: &str = ".fixity.db";

/// Append-only run log created inside each verified root.
pub const DEFAULT_LOG_FILE_NAME: &str = ".fixity.log";

/// Default number of hashing workers.
pub const DEFAULT_WORKERS: usize = 10;

/// Default capacity of the task and result queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Configuration for one verification run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct VerifyConfig {
    /// Root directory to verify.
    pub root: PathBuf,

    /// Which files are re-examined.
    #[builder(default)]
    #[serde(default)]
    pub mode: ScanMode,

    /// Number of hashing workers (0 = available parallelism).
    #[builder(default = "DEFAULT_WORKERS")]
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the bounded task queue. Independent of `workers`.
    #[builder(default = "DEFAULT_QUEUE_CAPACITY")]
    #[serde(default = "default_queue_capacity")]
    pub task_queue_capacity: usize,

    /// Capacity of the bounded result queue.
    #[builder(default = "DEFAULT_QUEUE_CAPACITY")]
    #[serde(default = "default_queue_capacity")]
    pub result_queue_capacity: usize,

    /// Follow symbolic links while walking.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Name of the store file inside the root.
    #[builder(default = "DEFAULT_STORE_FILE_NAME.to_string()")]
    #[serde(default = "default_store_file_name")]
    pub store_file_name: String,

    /// Name of the run log inside the root.
    #[builder(default = "DEFAULT_LOG_FILE_NAME.to_string()")]
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,

    /// Extensions of checksum-list files that are never scanned.
    #[builder(default = "default_checksum_list_extensions()")]
    #[serde(default = "default_checksum_list_extensions")]
    pub checksum_list_extensions: Vec<String>,

    /// Extra glob patterns to skip, matched against name and relative path.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Seed for sampled modes; `None` seeds from the OS.
    #[builder(default)]
    #[serde(default)]
    pub sample_seed: Option<u64>,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_store_file_name() -> String {
    DEFAULT_STORE_FILE_NAME.to_string()
}

fn default_log_file_name() -> String {
    DEFAULT_LOG_FILE_NAME.to_string()
}

fn default_checksum_list_extensions() -> Vec<String> {
    ["sfv", "md5", "sha1", "sha256"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl VerifyConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            Some(_) => {}
            None => return Err("Root path is required".to_string()),
        }
        if self.task_queue_capacity == Some(0) || self.result_queue_capacity == Some(0) {
            return Err("Queue capacity must be at least 1".to_string());
        }
        if let Some(mode) = self.mode {
            mode.validate().map_err(|e| e.to_string())?;
        }
        if self.store_file_name.as_deref() == Some("") || self.log_file_name.as_deref() == Some("")
        {
            return Err("Store and log file names cannot be empty".to_string());
        }
        Ok(())
    }
}

impl VerifyConfig {
    /// Create a new config builder.
    pub fn builder() -> VerifyConfigBuilder {
        VerifyConfigBuilder::default()
    }

    /// Create a full-mode config for a root with all defaults.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: ScanMode::Full,
            workers: DEFAULT_WORKERS,
            task_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            result_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            follow_symlinks: false,
            store_file_name: default_store_file_name(),
            log_file_name: default_log_file_name(),
            checksum_list_extensions: default_checksum_list_extensions(),
            ignore_patterns: Vec::new(),
            sample_seed: None,
        }
    }

    /// Same config with a different mode.
    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Path of the store file for this root.
    pub fn store_path(&self) -> PathBuf {
        self.root.join(&self.store_file_name)
    }

    /// Path of the run log for this root.
    pub fn log_path(&self) -> PathBuf {
        self.root.join(&self.log_file_name)
    }

    /// Worker count with `0` resolved to the machine's parallelism.
    pub fn effective_workers(&self) -> usize {
        match self.workers {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }

    /// Check if a file name belongs to the store or the run log.
    ///
    /// SQLite side files (`-journal`, `-wal`, `-shm`) count as store files.
    pub fn is_own_artifact(&self, file_name: &str) -> bool {
        if file_name == self.log_file_name {
            return true;
        }
        match file_name.strip_prefix(self.store_file_name.as_str()) {
            Some(rest) => matches!(rest, "" | "-journal" | "-wal" | "-shm"),
            None => false,
        }
    }

    /// Check if a file name has a checksum-list extension (case-insensitive).
    pub fn is_checksum_list(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .checksum_list_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
