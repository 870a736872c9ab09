//! Decide what changed about a file and apply it to the store.

use std::path::Path;

use fixity_core::{FileRecord, Fingerprint, MtimeMarker, OpStatus, ResultRecord};
use fixity_scan::relative_key;
use fixity_store::ChecksumStore;

use crate::error::VerifyError;
use crate::fingerprint::{fingerprint_file, mtime_marker};

/// Compare freshly observed state against the stored record.
///
/// The marker decides whether a change was legitimate: a new marker means the
/// file was edited and the content is accepted, while a different fingerprint
/// under an unchanged marker means the bytes changed without an edit.
pub fn classify(
    stored: Option<&FileRecord>,
    fingerprint: &Fingerprint,
    marker: &MtimeMarker,
) -> OpStatus {
    match stored {
        None => OpStatus::Added,
        Some(record) if record.mtime_marker != *marker => OpStatus::Modified,
        Some(record) if record.fingerprint == *fingerprint => OpStatus::Unchanged,
        Some(_) => OpStatus::Corrupted,
    }
}

/// Fingerprint one file, classify it and update the store.
///
/// Corrupted files leave the store untouched so the last-known-good
/// fingerprint survives for the next run.
pub fn verify_file(
    root: &Path,
    path: &Path,
    store: &ChecksumStore,
) -> Result<ResultRecord, VerifyError> {
    let digest = fingerprint_file(path)?;
    let marker = mtime_marker(path)?;
    let key = relative_key(root, path).ok_or_else(|| VerifyError::Path {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    let stored = store.lookup(&key)?;
    let status = classify(stored.as_ref(), &digest.fingerprint, &marker);

    match status {
        OpStatus::Added => store.insert(&key, &digest.fingerprint, &marker)?,
        OpStatus::Modified => store.update(&key, &digest.fingerprint, &marker)?,
        _ => {}
    }

    tracing::debug!(path = %key, status = %status, "classified");
    Ok(ResultRecord::new(key, status).with_bytes(digest.bytes))
}
