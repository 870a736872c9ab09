//! Ordered, short-circuiting file selection.

use std::path::Path;
use std::sync::{Arc, Mutex};

use globset::{Glob, GlobSet, GlobSetBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fixity_core::{ConfigError, ScanMode, VerifyConfig};
use fixity_store::ChecksumStore;

use crate::relpath::relative_key;

/// A regular file offered to the filter chain.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Canonical scan root.
    pub root: &'a Path,
    /// File name without directories.
    pub file_name: &'a str,
    /// Absolute path of the file.
    pub path: &'a Path,
}

impl<'a> Candidate<'a> {
    /// Create a candidate.
    pub fn new(root: &'a Path, file_name: &'a str, path: &'a Path) -> Self {
        Self {
            root,
            file_name,
            path,
        }
    }
}

/// Decision of a single filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Skip,
}

/// A predicate deciding whether a file is processed.
pub trait FileFilter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate one candidate.
    fn evaluate(&self, candidate: &Candidate<'_>) -> Verdict;
}

/// Skips the store, its SQLite side files, the run log and checksum lists.
#[derive(Debug, Clone)]
pub struct ExcludeArtifacts {
    config: VerifyConfig,
}

impl ExcludeArtifacts {
    pub fn new(config: &VerifyConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl FileFilter for ExcludeArtifacts {
    fn name(&self) -> &'static str {
        "exclude-artifacts"
    }

    fn evaluate(&self, candidate: &Candidate<'_>) -> Verdict {
        let name = candidate.file_name;
        // Matched by name at any depth, so stores of nested roots are skipped too.
        if self.config.is_own_artifact(name) || self.config.is_checksum_list(name) {
            Verdict::Skip
        } else {
            Verdict::Keep
        }
    }
}

/// Skips files matching user glob patterns.
///
/// Patterns are matched against both the file name and the `/`-separated
/// path relative to the root.
#[derive(Debug, Clone)]
pub struct IgnorePatterns {
    set: GlobSet,
}

impl IgnorePatterns {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ConfigError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self { set })
    }
}

impl FileFilter for IgnorePatterns {
    fn name(&self) -> &'static str {
        "ignore-patterns"
    }

    fn evaluate(&self, candidate: &Candidate<'_>) -> Verdict {
        if self.set.is_match(candidate.file_name) {
            return Verdict::Skip;
        }
        match relative_key(candidate.root, candidate.path) {
            Some(key) if self.set.is_match(key.as_str()) => Verdict::Skip,
            _ => Verdict::Keep,
        }
    }
}

/// Keeps only paths the store has never seen (incremental mode).
///
/// A failed lookup keeps the file so the worker reports the store error.
#[derive(Debug)]
pub struct UnknownToStore {
    store: Arc<ChecksumStore>,
}

impl UnknownToStore {
    pub fn new(store: Arc<ChecksumStore>) -> Self {
        Self { store }
    }
}

impl FileFilter for UnknownToStore {
    fn name(&self) -> &'static str {
        "unknown-to-store"
    }

    fn evaluate(&self, candidate: &Candidate<'_>) -> Verdict {
        let Some(key) = relative_key(candidate.root, candidate.path) else {
            return Verdict::Keep;
        };
        match self.store.lookup(&key) {
            Ok(Some(_)) => Verdict::Skip,
            Ok(None) => Verdict::Keep,
            Err(err) => {
                tracing::warn!(path = %key, error = %err, "store lookup failed during filtering");
                Verdict::Keep
            }
        }
    }
}

/// Keeps each file independently with probability `1/divisor`.
#[derive(Debug)]
pub struct RandomSample {
    divisor: u32,
    rng: Mutex<StdRng>,
}

impl RandomSample {
    /// Sample with an OS-seeded generator.
    pub fn new(divisor: u32) -> Result<Self, ConfigError> {
        Self::with_rng(divisor, StdRng::from_os_rng())
    }

    /// Sample with a fixed seed, for reproducible runs.
    pub fn seeded(divisor: u32, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(divisor, StdRng::seed_from_u64(seed))
    }

    fn with_rng(divisor: u32, rng: StdRng) -> Result<Self, ConfigError> {
        if divisor == 0 {
            return Err(ConfigError::ZeroSampleDivisor);
        }
        Ok(Self {
            divisor,
            rng: Mutex::new(rng),
        })
    }
}

impl FileFilter for RandomSample {
    fn name(&self) -> &'static str {
        "random-sample"
    }

    fn evaluate(&self, _candidate: &Candidate<'_>) -> Verdict {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        if rng.random_range(0..self.divisor) == 0 {
            Verdict::Keep
        } else {
            Verdict::Skip
        }
    }
}

/// Ordered filters; the first `Skip` wins.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn FileFilter>>,
}

impl FilterChain {
    /// Create an empty chain that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the chain for a run: artifact exclusion first, then user
    /// patterns, then the mode predicate.
    pub fn for_mode(config: &VerifyConfig, store: Arc<ChecksumStore>) -> Result<Self, ConfigError> {
        let mut chain = Self::new().with(ExcludeArtifacts::new(config));

        if !config.ignore_patterns.is_empty() {
            chain.push(IgnorePatterns::new(&config.ignore_patterns)?);
        }

        if config.mode == ScanMode::Incremental {
            chain.push(UnknownToStore::new(store));
        } else if let Some(divisor) = config.mode.sample_divisor() {
            match config.sample_seed {
                Some(seed) => chain.push(RandomSample::seeded(divisor, seed)?),
                None => chain.push(RandomSample::new(divisor)?),
            }
        }

        Ok(chain)
    }

    /// Append a filter.
    pub fn push(&mut self, filter: impl FileFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Append a filter, builder style.
    pub fn with(mut self, filter: impl FileFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    /// Run the filters in order, stopping at the first `Skip`.
    pub fn evaluate(&self, candidate: &Candidate<'_>) -> Verdict {
        for filter in &self.filters {
            if filter.evaluate(candidate) == Verdict::Skip {
                tracing::trace!(filter = filter.name(), path = %candidate.path.display(), "skipped");
                return Verdict::Skip;
            }
        }
        Verdict::Keep
    }

    /// Names of the filters in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.names())
            .finish()
    }
}
