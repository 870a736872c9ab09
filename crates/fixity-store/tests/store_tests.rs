use std::sync::Arc;
use std::thread;

use fixity_core::{Fingerprint, MtimeMarker};
use fixity_store::{ChecksumStore, StoreError};
use tempfile::TempDir;

#[test]
fn test_records_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join(".fixity.db");

    {
        let store = ChecksumStore::open(&db_path).unwrap();
        store
            .insert(
                "docs/readme.md",
                &Fingerprint::from_hex("abc123"),
                &MtimeMarker::new("2024-01-01T00:00:00.000000000Z"),
            )
            .unwrap();
    }

    let reopened = ChecksumStore::open(&db_path).unwrap();
    let record = reopened.lookup("docs/readme.md").unwrap().unwrap();
    assert_eq!(record.fingerprint.as_str(), "abc123");
    assert_eq!(reopened.path(), Some(db_path.as_path()));
}

#[test]
fn test_open_in_missing_directory_is_init_error() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("does/not/exist/.fixity.db");

    let err = ChecksumStore::open(&db_path).unwrap_err();
    assert!(matches!(err, StoreError::Init { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_concurrent_writers_are_serialized() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(ChecksumStore::open(temp.path().join(".fixity.db")).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    let path = format!("w{worker}/f{i}.bin");
                    assert!(store.lookup(&path).unwrap().is_none());
                    store
                        .insert(
                            &path,
                            &Fingerprint::from_hex(format!("{worker:02x}{i:02x}")),
                            &MtimeMarker::new("t0"),
                        )
                        .unwrap();
                    store
                        .update(&path, &Fingerprint::from_hex("ff"), &MtimeMarker::new("t1"))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), 200);
    assert!(
        store
            .records()
            .unwrap()
            .iter()
            .all(|r| r.mtime_marker.as_str() == "t1")
    );
}
