//! Streaming content fingerprints.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use blake3::Hasher;

use fixity_core::{Fingerprint, MtimeMarker};

use crate::error::VerifyError;

/// Read buffer size. Files are never loaded whole.
const CHUNK_SIZE: usize = 64 * 1024;

/// Fingerprint of a file plus the number of bytes read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub fingerprint: Fingerprint,
    pub bytes: u64,
}

/// Stream the whole file through BLAKE3.
pub fn fingerprint_file(path: &Path) -> Result<Digest, VerifyError> {
    let hash_err = |source| VerifyError::Hash {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(hash_err)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut bytes = 0u64;

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(hash_err(e)),
        };
        hasher.update(&buffer[..bytes_read]);
        bytes += bytes_read as u64;
    }

    Ok(Digest {
        fingerprint: Fingerprint::from_hex(hasher.finalize().to_hex().as_str()),
        bytes,
    })
}

/// Read the modification-time marker of a file.
pub fn mtime_marker(path: &Path) -> Result<MtimeMarker, VerifyError> {
    let stat_err = |source| VerifyError::Stat {
        path: path.to_path_buf(),
        source,
    };

    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(stat_err)?;
    Ok(MtimeMarker::from_system_time(modified))
}
