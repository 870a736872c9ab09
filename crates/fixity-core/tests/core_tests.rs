use fixity_core::{
    FileRecord, Fingerprint, MtimeMarker, OpStatus, ResultRecord, RunSummary, ScanMode,
    ScanWarning, StatusCounts, VerifyConfig, WarningKind,
};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use strum::IntoEnumIterator;

#[test]
fn test_file_record_roundtrips_through_json() {
    let record = FileRecord::new(
        "photos/2021/img.jpg",
        Fingerprint::from_hex("deadbeef"),
        MtimeMarker::new("2021-06-01T12:00:00.000000000Z"),
    );

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains(r#""fingerprint":"deadbeef""#));

    let back: FileRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn test_mtime_marker_tracks_every_change() {
    let base = SystemTime::now();
    let later = base + Duration::from_nanos(1);

    assert_eq!(
        MtimeMarker::from_system_time(base),
        MtimeMarker::from_system_time(base)
    );
    assert_ne!(
        MtimeMarker::from_system_time(base),
        MtimeMarker::from_system_time(later)
    );
}

#[test]
fn test_every_status_is_counted() {
    let mut counts = StatusCounts::new();
    for status in OpStatus::iter() {
        counts.record(status);
    }

    assert_eq!(counts.total(), 5);
    for status in OpStatus::iter() {
        assert_eq!(counts.get(status), 1);
    }
}

#[test]
fn test_result_record_for_each_status() {
    for status in OpStatus::iter() {
        let result = ResultRecord::new("dir/file.bin", status);
        assert_eq!(result.status, status);
        assert!(result.message.contains("dir/file.bin"));
    }
}

#[test]
fn test_mode_menu_matches_codes() {
    for (code, label) in ScanMode::menu() {
        let mode = ScanMode::from_code(code).unwrap();
        assert!(!label.is_empty());
        if let Some(p) = mode.sample_divisor() {
            assert!(label.contains(&p.to_string()));
        }
    }
}

#[test]
fn test_sampled_modes_decrease_density() {
    let divisors: Vec<u32> = (3..=5)
        .map(|code| ScanMode::from_code(code).unwrap().sample_divisor().unwrap())
        .collect();
    assert!(divisors.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn test_run_summary_json_shape() {
    let mut counts = StatusCounts::new();
    counts.record(OpStatus::Corrupted);
    counts.record(OpStatus::Unchanged);

    let summary = RunSummary {
        root: PathBuf::from("/data"),
        mode: ScanMode::Sampled(2),
        counts,
        total_processed: 2,
        eligible: 2,
        bytes_hashed: 2048,
        elapsed_secs: 0.42,
        finished_at: chrono::Utc::now(),
        corrupted_paths: vec!["broken.bin".into()],
        failed_paths: Vec::new(),
        scan_warnings: vec![ScanWarning::new(
            "/data/locked",
            "Permission denied",
            WarningKind::PermissionDenied,
        )],
    };

    assert!(summary.has_corruption());
    assert!(summary.is_complete());

    let value: serde_json::Value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["mode"]["sampled"], 2);
    assert_eq!(value["counts"]["corrupted"], 1);
    assert_eq!(value["corrupted_paths"][0], "broken.bin");

    let back: RunSummary = serde_json::from_value(value).unwrap();
    assert_eq!(back, summary);
}

#[test]
fn test_config_artifacts_follow_custom_names() {
    let config = VerifyConfig::builder()
        .root("/data")
        .store_file_name("integrity.db")
        .log_file_name("verify.log")
        .build()
        .unwrap();

    assert!(config.is_own_artifact("integrity.db"));
    assert!(config.is_own_artifact("integrity.db-shm"));
    assert!(config.is_own_artifact("verify.log"));
    assert!(!config.is_own_artifact(".fixity.db"));
}
