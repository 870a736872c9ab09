//! Directory scanning and file selection for fixity.
//!
//! This crate decides *which* files a verification run processes:
//!
//! - **Filter chain**: ordered predicates; the first `Skip` wins. The store,
//!   run log and checksum-list files are always excluded first, then user
//!   ignore patterns, then the scan-mode predicate (incremental or sampled).
//! - **Directory scanner**: parallel traversal via jwalk producing the list
//!   of eligible absolute paths. Per-entry failures are warnings, not errors.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fixity_core::{ScanMode, VerifyConfig};
//! use fixity_scan::{DirectoryScanner, FilterChain};
//! use fixity_store::ChecksumStore;
//!
//! let config = VerifyConfig::new("/data").with_mode(ScanMode::Sampled(10));
//! let store = Arc::new(ChecksumStore::open(config.store_path()).unwrap());
//! let chain = FilterChain::for_mode(&config, store).unwrap();
//!
//! let outcome = DirectoryScanner::new().scan(&config, &chain).unwrap();
//! println!("{} files selected", outcome.count);
//! ```

mod filter;
mod links;
mod progress;
mod relpath;
mod scanner;

pub use filter::{
    Candidate, ExcludeArtifacts, FileFilter, FilterChain, IgnorePatterns, RandomSample,
    UnknownToStore, Verdict,
};
pub use links::{LinkResolution, LinkTargets};
pub use progress::ScanProgress;
pub use relpath::relative_key;
pub use scanner::{DirectoryScanner, ScanOutcome, canonical_root};

// Re-export core types for convenience
pub use fixity_core::{ScanError, ScanMode, ScanWarning, VerifyConfig, WarningKind};
