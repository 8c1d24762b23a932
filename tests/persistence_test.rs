#![cfg(any(feature = "storage-rocksdb", feature = "storage-sqlite"))]

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

mod common;

/// Imports two files in separate runs against the same database and checks
/// the second run sees the rows of the first.
fn assert_recovers(db_args: &[&str], dir: &std::path::Path) {
    let first = dir.join("first.csv");
    common::write_csv(
        &first,
        &["2f1b5c1e-8a43-4d35-9d7e-5d1b7b0f6a01, 2024-05-01T10:00:00Z, accepted, O1, INR, 100.0"],
    );
    let second = dir.join("second.csv");
    common::write_csv(
        &second,
        &["7c9e2d4a-1b6f-4e8a-a3c5-0e7d9f2b4c02, 2024-05-01T10:00:01Z, failed, O2, INR, 50.0"],
    );

    let output1 = Command::new(cargo_bin!("txstore"))
        .arg(&first)
        .args(db_args)
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    assert_eq!(String::from_utf8_lossy(&output1.stdout).lines().count(), 2);

    let output2 = Command::new(cargo_bin!("txstore"))
        .arg(&second)
        .args(db_args)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // Header plus the rows of both runs
    assert_eq!(stdout2.lines().count(), 3);
    assert!(stdout2.contains("accepted,O1,INR,100.0"));
    assert!(stdout2.contains("failed,O2,INR,50.0"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let db_path = db_path.to_str().unwrap();
    assert_recovers(&["--db-path", db_path], dir.path());
}

#[cfg(feature = "storage-sqlite")]
#[test]
fn test_sqlite_persistence_recovery() {
    let dir = tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("txns.db").display());
    assert_recovers(&["--database-url", &url], dir.path());
}
