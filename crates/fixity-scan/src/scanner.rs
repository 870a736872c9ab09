//! JWalk-based directory enumeration feeding the filter chain.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use jwalk::WalkDir;
use tokio::sync::broadcast;

use fixity_core::{ScanError, ScanWarning, VerifyConfig, WarningKind};

use crate::filter::{Candidate, FilterChain, Verdict};
use crate::links::{LinkResolution, LinkTargets};
use crate::progress::ScanProgress;

/// Publish a progress snapshot every this many files.
const PROGRESS_INTERVAL: u64 = 256;

/// Eligible files found under a root.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Canonical root that was walked.
    pub root: PathBuf,
    /// Number of eligible files. Always equals `files.len()`.
    pub count: u64,
    /// Absolute paths of eligible files, in walk order.
    pub files: Vec<PathBuf>,
    /// Non-fatal problems encountered during the walk.
    pub warnings: Vec<ScanWarning>,
    /// Time spent walking.
    pub duration: Duration,
}

impl ScanOutcome {
    /// Check if the walk was only partially successful.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Recursive scanner using jwalk for parallel directory reads.
pub struct DirectoryScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl DirectoryScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Enumerate every regular file under `config.root` that survives `chain`.
    ///
    /// Only an unusable root is an error. Unreadable subtrees and broken
    /// entries become warnings and enumeration of their siblings continues.
    pub fn scan(&self, config: &VerifyConfig, chain: &FilterChain) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let root = canonical_root(&config.root)?;

        let walker = WalkDir::new(&root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(config.follow_symlinks)
            .min_depth(1);

        let links = LinkTargets::new(&root);
        let mut files = Vec::new();
        let mut warnings = Vec::new();
        let mut files_seen: u64 = 0;

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    let warning = match err.io_error() {
                        Some(io) => ScanWarning::from_io(&path, io),
                        None => ScanWarning::new(
                            &path,
                            err.to_string(),
                            WarningKind::ReadError,
                        ),
                    };
                    record_warning(&mut warnings, warning);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if !file_type.is_file() {
                if file_type.is_symlink() {
                    if config.follow_symlinks {
                        // A followed link that is still a link has no target.
                        record_warning(
                            &mut warnings,
                            ScanWarning::new(
                                entry.path(),
                                "Broken symbolic link",
                                WarningKind::ReadError,
                            ),
                        );
                    } else {
                        tracing::debug!(path = %entry.path().display(), "symlink not followed");
                    }
                }
                continue;
            }

            let path = entry.path();

            if config.follow_symlinks {
                match links.resolve(&path) {
                    Ok(LinkResolution::Emit) => {}
                    Ok(LinkResolution::Alias { target }) => {
                        record_warning(&mut warnings, ScanWarning::aliased(&path, &target));
                        continue;
                    }
                    Err(err) => {
                        record_warning(
                            &mut warnings,
                            ScanWarning::new(&path, err.to_string(), WarningKind::MetadataError),
                        );
                        continue;
                    }
                }
            }

            let file_name = entry.file_name().to_string_lossy();
            let candidate = Candidate::new(&root, &file_name, &path);
            let verdict = chain.evaluate(&candidate);

            if files_seen % PROGRESS_INTERVAL == 0 {
                let _ = self.progress_tx.send(ScanProgress {
                    files_seen: files_seen + 1,
                    files_selected: files.len() as u64 + u64::from(verdict == Verdict::Keep),
                    current_path: path.clone(),
                    warnings: warnings.len() as u64,
                    elapsed: start.elapsed(),
                });
            }
            files_seen += 1;

            if verdict == Verdict::Keep {
                files.push(path);
            }
        }

        let duration = start.elapsed();
        tracing::info!(
            root = %root.display(),
            seen = files_seen,
            eligible = files.len(),
            warnings = warnings.len(),
            external_targets = links.external_len(),
            elapsed_ms = duration.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanOutcome {
            root,
            count: files.len() as u64,
            files,
            warnings,
            duration,
        })
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonicalize the root and make sure it is a directory.
pub fn canonical_root(root: &Path) -> Result<PathBuf, ScanError> {
    let root_path = root.canonicalize().map_err(|e| ScanError::io(root, e))?;
    if !root_path.is_dir() {
        return Err(ScanError::NotADirectory { path: root_path });
    }
    Ok(root_path)
}

fn record_warning(warnings: &mut Vec<ScanWarning>, warning: ScanWarning) {
    tracing::warn!(path = %warning.path.display(), kind = ?warning.kind, "{}", warning.message);
    warnings.push(warning);
}
