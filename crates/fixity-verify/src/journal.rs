//! Append-only run log.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fixity_core::{RunSummary, VerifyConfig};

use crate::error::VerifyError;

/// One JSON-encoded [`RunSummary`] per line, oldest first.
#[derive(Debug, Clone)]
pub struct RunJournal {
    path: PathBuf,
}

impl RunJournal {
    /// Journal at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Journal inside the configured root.
    pub fn for_config(config: &VerifyConfig) -> Self {
        Self::new(config.log_path())
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a summary as a single line, creating the file if needed.
    pub fn append(&self, summary: &RunSummary) -> Result<(), VerifyError> {
        let mut line = serde_json::to_string(summary)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        // One write call per line keeps concurrent appenders from interleaving.
        file.write_all(line.as_bytes())
            .map_err(|source| self.io_error(source))?;

        tracing::debug!(path = %self.path.display(), "run summary appended");
        Ok(())
    }

    /// Read every recorded run. A missing journal has no runs.
    pub fn read_all(&self) -> Result<Vec<RunSummary>, VerifyError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut runs = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| self.io_error(source))?;
            if line.trim().is_empty() {
                continue;
            }
            let summary = serde_json::from_str(&line).map_err(|source| VerifyError::JournalEntry {
                path: self.path.clone(),
                line: index + 1,
                source,
            })?;
            runs.push(summary);
        }
        Ok(runs)
    }

    /// The most recent `limit` runs, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<RunSummary>, VerifyError> {
        let mut runs = self.read_all()?;
        runs.reverse();
        runs.truncate(limit);
        Ok(runs)
    }

    fn io_error(&self, source: std::io::Error) -> VerifyError {
        VerifyError::Journal {
            path: self.path.clone(),
            source,
        }
    }
}
