//! Tests for WAL Writer
//!
//! These tests verify:
//! - Writing records to the WAL
//! - Reopening appends after existing content
//! - Reset (truncate to empty)
//! - Failed writes surface as Persistence errors

use std::fs;
use std::path::PathBuf;

use remotelist::wal::{LogRecord, WalReader, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.log");
    (temp_dir, wal_path)
}

fn append(list_id: &str, value: i64) -> LogRecord {
    LogRecord::Append {
        list_id: list_id.to_string(),
        value,
    }
}

// =============================================================================
// Basic Writing Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path).unwrap();

    assert!(wal_path.exists());
    assert!(writer.is_empty().unwrap());
    assert_eq!(writer.records_written(), 0);
    assert_eq!(writer.path(), wal_path.as_path());
}

#[test]
fn test_record_writes_text_lines() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.record(&append("a", 10)).unwrap();
    writer.record(&append("a", 20)).unwrap();
    writer
        .record(&LogRecord::Remove {
            list_id: "a".to_string(),
        })
        .unwrap();

    assert_eq!(writer.records_written(), 3);
    let contents = fs::read_to_string(&wal_path).unwrap();
    assert_eq!(contents, "APPEND a 10\nAPPEND a 20\nREMOVE a\n");
}

#[test]
fn test_reopen_appends_after_existing_records() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path).unwrap();
        writer.record(&append("a", 1)).unwrap();
    }
    {
        let mut writer = WalWriter::open(&wal_path).unwrap();
        assert_eq!(writer.records_written(), 0);
        writer.record(&append("a", 2)).unwrap();
    }

    let records: Vec<_> = WalReader::open(&wal_path)
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(records, vec![append("a", 1), append("a", 2)]);
}

#[test]
fn test_reopen_terminates_torn_tail() {
    let (_temp, wal_path) = setup_temp_wal();
    fs::write(&wal_path, "APPEND a 1\nAPPEND a").unwrap();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.record(&append("a", 2)).unwrap();

    let contents = fs::read_to_string(&wal_path).unwrap();
    assert_eq!(contents, "APPEND a 1\nAPPEND a\nAPPEND a 2\n");
}

// =============================================================================
// Reset Tests
// =============================================================================

#[test]
fn test_reset_empties_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    for i in 0..10 {
        writer.record(&append("a", i)).unwrap();
    }
    assert!(writer.len().unwrap() > 0);

    writer.reset().unwrap();

    assert_eq!(writer.records_written(), 0);
    assert!(writer.is_empty().unwrap());
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 0);
}

#[test]
fn test_writes_after_reset_start_at_beginning() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.record(&append("old", 1)).unwrap();
    writer.reset().unwrap();
    writer.record(&append("new", 2)).unwrap();

    let contents = fs::read_to_string(&wal_path).unwrap();
    assert_eq!(contents, "APPEND new 2\n");
}

// =============================================================================
// Failure Tests
// =============================================================================

#[cfg(target_os = "linux")]
#[test]
fn test_record_failure_is_persistence_error() {
    use remotelist::ListError;

    // Every write to /dev/full fails with ENOSPC
    let mut writer = WalWriter::open(std::path::Path::new("/dev/full")).unwrap();

    let result = writer.record(&append("a", 1));

    assert!(matches!(result, Err(ListError::Persistence(_))));
    assert_eq!(writer.records_written(), 0);
}
