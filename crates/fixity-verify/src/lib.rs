//! Fingerprint verification pipeline for fixity.
//!
//! Ties the store and scanner together into a full run:
//!
//! 1. The [`Verifier`] opens the root's checksum store and walks the root
//!    through the mode's filter chain.
//! 2. Eligible paths go through a bounded task queue to a [`WorkerPool`].
//!    Each worker streams the file through BLAKE3, reads its modification
//!    time and [`classify`]s it against the stored record.
//! 3. The [`Aggregator`] consumes results on the calling thread, reports
//!    progress through a [`ProgressSink`] and builds the [`RunSummary`].
//! 4. The summary is appended to the root's [`RunJournal`].
//!
//! # Classification
//!
//! | stored record | marker | fingerprint | outcome     | store     |
//! |---------------|--------|-------------|-------------|-----------|
//! | absent        |        |             | `Added`     | inserted  |
//! | present       | same   | same        | `Unchanged` | untouched |
//! | present       | same   | different   | `Corrupted` | untouched |
//! | present       | new    | any         | `Modified`  | updated   |
//!
//! # Example
//!
//! ```rust,no_run
//! use fixity_core::{ScanMode, VerifyConfig};
//! use fixity_verify::{NoProgress, Verifier};
//!
//! let config = VerifyConfig::new("/data").with_mode(ScanMode::Full);
//! let summary = Verifier::new(config)?.run(&NoProgress)?;
//!
//! for path in &summary.corrupted_paths {
//!     println!("corrupted: {path}");
//! }
//! # Ok::<(), fixity_verify::VerifyError>(())
//! ```

mod aggregate;
mod classify;
mod error;
mod fingerprint;
mod journal;
mod verifier;
mod worker;

pub use aggregate::{Aggregator, NoProgress, ProgressSink};
pub use classify::{classify, verify_file};
pub use error::VerifyError;
pub use fingerprint::{Digest, fingerprint_file, mtime_marker};
pub use journal::RunJournal;
pub use verifier::Verifier;
pub use worker::WorkerPool;

// Re-export core types for convenience
pub use fixity_core::{OpStatus, ResultRecord, RunSummary, ScanMode, StatusCounts, VerifyConfig};
pub use fixity_scan::ScanProgress;
