use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use fixity_core::{ScanMode, VerifyConfig};
use fixity_store::{ChecksumStore, StoreError};
use fixity_verify::{NoProgress, ProgressSink, RunJournal, Verifier, VerifyError};
use tempfile::TempDir;

fn populated_root(files: usize) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("a/b")).unwrap();
    for i in 0..files {
        let dir = match i % 3 {
            0 => "",
            1 => "a",
            _ => "a/b",
        };
        fs::write(
            temp.path().join(dir).join(format!("file{i:03}.dat")),
            format!("payload number {i}"),
        )
        .unwrap();
    }
    temp
}

fn run(config: VerifyConfig) -> fixity_core::RunSummary {
    Verifier::new(config).unwrap().run(&NoProgress).unwrap()
}

fn modified_time(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

fn set_modified(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

#[test]
fn test_every_eligible_file_produces_one_result() {
    let temp = populated_root(57);
    let config = VerifyConfig::builder()
        .root(temp.path())
        .workers(3usize)
        .task_queue_capacity(2usize)
        .result_queue_capacity(1usize)
        .build()
        .unwrap();

    let summary = run(config);

    assert_eq!(summary.eligible, 57);
    assert_eq!(summary.total_processed, 57);
    assert_eq!(summary.counts.added, 57);
    assert!(summary.is_complete());
}

#[test]
fn test_second_full_run_is_unchanged() {
    let temp = populated_root(12);

    let first = run(VerifyConfig::new(temp.path()));
    assert_eq!(first.counts.added, 12);

    let second = run(VerifyConfig::new(temp.path()));
    assert_eq!(second.counts.unchanged, 12);
    assert_eq!(second.counts.total(), 12);
    assert!(!second.has_corruption());
}

#[test]
fn test_new_file_is_added_then_unchanged() {
    let temp = populated_root(4);
    run(VerifyConfig::new(temp.path()));

    fs::write(temp.path().join("a/new.txt"), "fresh").unwrap();
    let verifier = Verifier::new(VerifyConfig::new(temp.path())).unwrap();
    let store = verifier.store_handle();
    let summary = verifier.run(&NoProgress).unwrap();

    assert_eq!(summary.counts.added, 1);
    assert_eq!(summary.counts.unchanged, 4);
    assert!(store.lookup("a/new.txt").unwrap().is_some());

    let again = run(VerifyConfig::new(temp.path()));
    assert_eq!(again.counts.unchanged, 5);
}

#[test]
fn test_edit_with_new_mtime_is_modified() {
    let temp = populated_root(3);
    let target = temp.path().join("file000.dat");
    run(VerifyConfig::new(temp.path()));

    let before = ChecksumStore::open(temp.path().join(".fixity.db"))
        .unwrap()
        .lookup("file000.dat")
        .unwrap()
        .unwrap();

    let mtime = modified_time(&target);
    fs::write(&target, "edited content").unwrap();
    set_modified(&target, mtime + Duration::from_secs(10));

    let verifier = Verifier::new(VerifyConfig::new(temp.path())).unwrap();
    let store = verifier.store_handle();
    let summary = verifier.run(&NoProgress).unwrap();

    assert_eq!(summary.counts.modified, 1);
    assert_eq!(summary.counts.unchanged, 2);
    let after = store.lookup("file000.dat").unwrap().unwrap();
    assert_ne!(after.fingerprint, before.fingerprint);
    assert_ne!(after.mtime_marker, before.mtime_marker);
}

#[test]
fn test_silent_change_is_corrupted() {
    let temp = populated_root(3);
    let target = temp.path().join("a/b/file002.dat");
    run(VerifyConfig::new(temp.path()));

    let mtime = modified_time(&target);
    fs::write(&target, "bit rot happened here").unwrap();
    set_modified(&target, mtime);

    let verifier = Verifier::new(VerifyConfig::new(temp.path())).unwrap();
    let store = verifier.store_handle();
    let stored = store.lookup("a/b/file002.dat").unwrap().unwrap();
    let summary = verifier.run(&NoProgress).unwrap();

    assert_eq!(summary.counts.corrupted, 1);
    assert_eq!(summary.corrupted_paths, vec!["a/b/file002.dat"]);
    assert_eq!(store.lookup("a/b/file002.dat").unwrap().unwrap(), stored);

    // Still corrupted next time: the good fingerprint was kept.
    let again = run(VerifyConfig::new(temp.path()));
    assert_eq!(again.counts.corrupted, 1);
}

#[test]
fn test_sampled_mode_density() {
    let temp = populated_root(300);
    let config = VerifyConfig::builder()
        .root(temp.path())
        .mode(ScanMode::Sampled(2))
        .sample_seed(7u64)
        .build()
        .unwrap();

    let summary = run(config);

    assert_eq!(summary.mode, ScanMode::Sampled(2));
    assert!(
        summary.eligible > 100 && summary.eligible < 200,
        "sampled {} of 300",
        summary.eligible
    );
    assert_eq!(summary.total_processed, summary.eligible);
}

#[test]
fn test_pool_size_does_not_change_outcome() {
    let temp = populated_root(40);
    let config_for = |workers: usize| {
        VerifyConfig::builder()
            .root(temp.path())
            .workers(workers)
            .store_file_name(format!(".run-{workers}.db"))
            .log_file_name(format!(".run-{workers}.log"))
            .ignore_patterns(vec![".run-*".to_string()])
            .build()
            .unwrap()
    };

    let single = Verifier::new(config_for(1)).unwrap();
    let single_store = single.store_handle();
    let single_summary = single.run(&NoProgress).unwrap();

    let many = Verifier::new(config_for(8)).unwrap();
    let many_store = many.store_handle();
    let many_summary = many.run(&NoProgress).unwrap();

    assert_eq!(single_summary.counts, many_summary.counts);
    assert_eq!(single_store.records().unwrap(), many_store.records().unwrap());
}

#[test]
fn test_incremental_only_processes_untracked() {
    let temp = populated_root(9);
    run(VerifyConfig::new(temp.path()));

    fs::write(temp.path().join("a/b/late.dat"), "late arrival").unwrap();
    let summary = run(VerifyConfig::new(temp.path()).with_mode(ScanMode::Incremental));

    assert_eq!(summary.eligible, 1);
    assert_eq!(summary.counts.added, 1);
    assert_eq!(summary.counts.unchanged, 0);
}

#[test]
fn test_own_files_and_checksum_lists_are_never_verified() {
    let temp = populated_root(5);
    fs::write(temp.path().join("a/release.SFV"), "file001.dat 00000000").unwrap();
    fs::write(temp.path().join("a/b/sums.sha256"), "abc  file002.dat").unwrap();

    run(VerifyConfig::new(temp.path()));
    let second = run(VerifyConfig::new(temp.path()));

    assert_eq!(second.eligible, 5);
    assert_eq!(second.counts.unchanged, 5);
    let store = ChecksumStore::open(temp.path().join(".fixity.db")).unwrap();
    assert!(
        store
            .records()
            .unwrap()
            .iter()
            .all(|r| r.relative_path.ends_with(".dat"))
    );
}

#[test]
fn test_run_log_gets_one_line_per_run() {
    let temp = populated_root(6);
    let first = run(VerifyConfig::new(temp.path()));
    let second = run(VerifyConfig::new(temp.path()));

    let journal = RunJournal::new(temp.path().join(".fixity.log"));
    let runs = journal.read_all().unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].counts, first.counts);
    assert_eq!(runs[1].counts, second.counts);
    assert_eq!(runs[1].root, second.root);
}

#[test]
fn test_progress_sink_sees_every_result() {
    #[derive(Default)]
    struct Counting {
        total: Cell<u64>,
        advanced: Cell<u64>,
        messages: RefCell<Vec<String>>,
        finished: Cell<bool>,
    }

    impl ProgressSink for Counting {
        fn begin(&self, total: u64) {
            self.total.set(total);
        }

        fn advance(&self, increment: u64, message: &str) {
            self.advanced.set(self.advanced.get() + increment);
            self.messages.borrow_mut().push(message.to_string());
        }

        fn finish(&self) {
            self.finished.set(true);
        }
    }

    let temp = populated_root(8);
    let sink = Counting::default();
    Verifier::new(VerifyConfig::new(temp.path()))
        .unwrap()
        .run(&sink)
        .unwrap();

    assert_eq!(sink.total.get(), 8);
    assert_eq!(sink.advanced.get(), 8);
    assert!(sink.finished.get());
    assert!(
        sink.messages
            .borrow()
            .iter()
            .all(|m| m.starts_with("Now tracking: "))
    );
}

#[cfg(unix)]
#[test]
fn test_hard_links_each_get_a_record() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "linked payload").unwrap();
    fs::hard_link(temp.path().join("a.txt"), temp.path().join("b.txt")).unwrap();

    let config = VerifyConfig::builder()
        .root(temp.path())
        .follow_symlinks(true)
        .build()
        .unwrap();
    let verifier = Verifier::new(config).unwrap();
    let store = verifier.store_handle();
    let summary = verifier.run(&NoProgress).unwrap();

    assert_eq!(summary.counts.added, 2);
    let a = store.lookup("a.txt").unwrap().unwrap();
    let b = store.lookup("b.txt").unwrap().unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
}

#[test]
fn test_missing_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let err = Verifier::new(VerifyConfig::new(temp.path().join("absent"))).unwrap_err();
    assert!(matches!(err, VerifyError::Scan(_)));
}

#[test]
fn test_unopenable_store_is_fatal() {
    let temp = populated_root(2);
    fs::create_dir(temp.path().join(".fixity.db")).unwrap();

    let err = Verifier::new(VerifyConfig::new(temp.path())).unwrap_err();
    assert!(matches!(err, VerifyError::Store(StoreError::Init { .. })));
}

#[test]
fn test_empty_root() {
    let temp = TempDir::new().unwrap();
    let summary = run(VerifyConfig::new(temp.path()));

    assert_eq!(summary.eligible, 0);
    assert_eq!(summary.total_processed, 0);
    assert!(summary.is_complete());
}

#[test]
fn test_zero_workers_uses_available_parallelism() {
    let temp = populated_root(10);
    let config = VerifyConfig::builder()
        .root(temp.path())
        .workers(0usize)
        .build()
        .unwrap();

    let summary = run(config);
    assert_eq!(summary.counts.added, 10);
    assert!(summary.is_complete());
}
