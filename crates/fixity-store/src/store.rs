//! SQLite-backed checksum table keyed by relative path.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use fixity_core::{FileRecord, Fingerprint, MtimeMarker};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StoreError;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS files_checksum (
    relative_path TEXT NOT NULL UNIQUE,
    fingerprint TEXT NOT NULL,
    mtime_marker TEXT NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_files_checksum_path ON files_checksum (relative_path)";

const SELECT_ONE: &str =
    "SELECT relative_path, fingerprint, mtime_marker FROM files_checksum WHERE relative_path = ?1";

const SELECT_ALL: &str =
    "SELECT relative_path, fingerprint, mtime_marker FROM files_checksum ORDER BY relative_path";

const INSERT: &str =
    "INSERT INTO files_checksum (relative_path, fingerprint, mtime_marker) VALUES (?1, ?2, ?3)";

const UPDATE: &str =
    "UPDATE files_checksum SET fingerprint = ?2, mtime_marker = ?3 WHERE relative_path = ?1";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable mapping from relative path to the last-known-good file state.
///
/// The connection lives behind a single mutex and is never handed out, so
/// every read and write is serialized across workers.
pub struct ChecksumStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl ChecksumStore {
    /// Open (creating if needed) the store file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let init_err = |source| StoreError::Init {
            location: path.display().to_string(),
            source,
        };

        let conn = Connection::open(path).map_err(init_err)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(init_err)?;

        let store = Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        };
        store.initialize()?;

        tracing::debug!(path = %path.display(), "checksum store opened");
        Ok(store)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Init {
            location: ":memory:".to_string(),
            source,
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create the table and its path index if absent. Idempotent.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(&format!("{CREATE_TABLE}; {CREATE_INDEX};"))
            .map_err(|source| StoreError::Init {
                location: self.location(),
                source,
            })
    }

    /// Fetch the record for a path. A missing path is `Ok(None)`.
    pub fn lookup(&self, relative_path: &str) -> Result<Option<FileRecord>, StoreError> {
        let query_err = |source| StoreError::Query {
            path: relative_path.into(),
            source,
        };

        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(SELECT_ONE).map_err(query_err)?;
        stmt.query_row(params![relative_path], row_to_record)
            .optional()
            .map_err(query_err)
    }

    /// Add a record for a path the store does not track yet.
    pub fn insert(
        &self,
        relative_path: &str,
        fingerprint: &Fingerprint,
        mtime_marker: &MtimeMarker,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.prepare_cached(INSERT)
            .and_then(|mut stmt| {
                stmt.execute(params![
                    relative_path,
                    fingerprint.as_str(),
                    mtime_marker.as_str()
                ])
            })
            .map_err(|source| StoreError::Write {
                path: relative_path.into(),
                source,
            })?;
        Ok(())
    }

    /// Replace the fingerprint and marker of a tracked path.
    pub fn update(
        &self,
        relative_path: &str,
        fingerprint: &Fingerprint,
        mtime_marker: &MtimeMarker,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .prepare_cached(UPDATE)
            .and_then(|mut stmt| {
                stmt.execute(params![
                    relative_path,
                    fingerprint.as_str(),
                    mtime_marker.as_str()
                ])
            })
            .map_err(|source| StoreError::Write {
                path: relative_path.into(),
                source,
            })?;

        if changed == 0 {
            return Err(StoreError::NotTracked {
                path: relative_path.into(),
            });
        }
        Ok(())
    }

    /// Number of tracked paths.
    pub fn len(&self) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM files_checksum", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as u64)
        .map_err(|source| StoreError::Query {
            path: "*".into(),
            source,
        })
    }

    /// Check if nothing is tracked yet.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Every tracked record, ordered by path.
    pub fn records(&self) -> Result<Vec<FileRecord>, StoreError> {
        let query_err = |source| StoreError::Query {
            path: "*".into(),
            source,
        };

        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(SELECT_ALL).map_err(query_err)?;
        let rows = stmt.query_map([], row_to_record).map_err(query_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    /// Backing file path (`None` for in-memory stores).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn location(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string())
    }
}

impl std::fmt::Debug for ChecksumStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumStore")
            .field("location", &self.location())
            .finish_non_exhaustive()
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    let relative_path: String = row.get(0)?;
    let fingerprint: String = row.get(1)?;
    let mtime_marker: String = row.get(2)?;
    Ok(FileRecord::new(
        relative_path,
        Fingerprint::from_hex(fingerprint),
        MtimeMarker::new(mtime_marker),
    ))
}
