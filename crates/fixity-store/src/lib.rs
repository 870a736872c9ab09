//! Persistent checksum store for fixity.
//!
//! One SQLite file per verified root holds a single `files_checksum` table
//! mapping each root-relative path to its last-known-good fingerprint and
//! modification-time marker. Records survive across runs and are never
//! pruned: files that disappear from disk keep their stale rows.
//!
//! ```rust,no_run
//! use fixity_core::{Fingerprint, MtimeMarker};
//! use fixity_store::ChecksumStore;
//!
//! let store = ChecksumStore::open("/data/.fixity.db").unwrap();
//! if store.lookup("photos/a.jpg").unwrap().is_none() {
//!     store
//!         .insert(
//!             "photos/a.jpg",
//!             &Fingerprint::from_hex("00ff"),
//!             &MtimeMarker::new("2024-01-01T00:00:00.000000000Z"),
//!         )
//!         .unwrap();
//! }
//! ```

mod error;
mod store;

pub use error::StoreError;
pub use store::ChecksumStore;
