//! Snapshot image tests
//!
//! Tests verify:
//! - Encode/decode round trip of a populated image
//! - Header and checksum validation
//! - Atomic write: temp file cleanup, previous snapshot preserved on failure
//! - Loading a missing snapshot

use std::collections::BTreeMap;
use std::fs;

use remotelist::snapshot::{
    self, temp_path, SnapshotImage, SNAPSHOT_HEADER_SIZE, SNAPSHOT_MAGIC,
};
use remotelist::ListError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_image() -> SnapshotImage {
    vec![
        ("A".to_string(), vec![10, 20, 30]),
        ("B".to_string(), vec![99]),
        ("empty".to_string(), vec![]),
        ("extremes".to_string(), vec![i64::MIN, -1, 0, i64::MAX]),
    ]
    .into_iter()
    .collect()
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_decode_preserves_every_list() {
    let image = sample_image();

    let bytes = image.encode().unwrap();
    let decoded = SnapshotImage::decode(&bytes).unwrap();

    assert_eq!(decoded, image);
    assert_eq!(decoded.list_count(), 4);
    assert_eq!(decoded.value_count(), 8);
}

#[test]
fn test_empty_image() {
    let image = SnapshotImage::new();

    let bytes = image.encode().unwrap();

    assert!(bytes.len() >= SNAPSHOT_HEADER_SIZE);
    assert_eq!(&bytes[0..4], &SNAPSHOT_MAGIC);
    assert_eq!(SnapshotImage::decode(&bytes).unwrap().lists, BTreeMap::new());
}

#[test]
fn test_decode_rejects_short_input() {
    let result = SnapshotImage::decode(&[0u8; 5]);
    assert!(matches!(result, Err(ListError::SnapshotCorruption(_))));
}

#[test]
fn test_decode_rejects_bad_magic() {
    let mut bytes = sample_image().encode().unwrap();
    bytes[0] = b'X';

    let result = SnapshotImage::decode(&bytes);
    assert!(matches!(result, Err(ListError::SnapshotCorruption(_))));
}

#[test]
fn test_decode_rejects_unknown_version() {
    let mut bytes = sample_image().encode().unwrap();
    bytes[5] = 0x7F;

    let result = SnapshotImage::decode(&bytes);
    assert!(matches!(result, Err(ListError::SnapshotCorruption(_))));
}

#[test]
fn test_decode_detects_flipped_payload_byte() {
    let mut bytes = sample_image().encode().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let result = SnapshotImage::decode(&bytes);
    assert!(matches!(result, Err(ListError::SnapshotCorruption(_))));
}

#[test]
fn test_decode_detects_truncated_payload() {
    let bytes = sample_image().encode().unwrap();

    let result = SnapshotImage::decode(&bytes[..bytes.len() - 3]);
    assert!(matches!(result, Err(ListError::SnapshotCorruption(_))));
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_load_missing_snapshot() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("none.snapshot");

    assert_eq!(snapshot::load(&path).unwrap(), None);
}

#[test]
fn test_write_atomic_then_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("lists.snapshot");
    let image = sample_image();

    let bytes = snapshot::write_atomic(&path, &image).unwrap();

    assert_eq!(bytes, fs::metadata(&path).unwrap().len());
    assert!(!temp_path(&path).exists());
    assert_eq!(snapshot::load(&path).unwrap(), Some(image));
}

#[test]
fn test_write_atomic_replaces_previous() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("lists.snapshot");

    snapshot::write_atomic(&path, &sample_image()).unwrap();
    let newer: SnapshotImage = vec![("C".to_string(), vec![1])].into_iter().collect();
    snapshot::write_atomic(&path, &newer).unwrap();

    assert_eq!(snapshot::load(&path).unwrap(), Some(newer));
}

#[test]
fn test_failed_write_keeps_previous_snapshot() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("lists.snapshot");
    snapshot::write_atomic(&path, &sample_image()).unwrap();

    // A directory in the temp file's place makes staging fail
    fs::create_dir(temp_path(&path)).unwrap();
    let result = snapshot::write_atomic(&path, &SnapshotImage::new());

    assert!(matches!(result, Err(ListError::Persistence(_))));
    assert_eq!(snapshot::load(&path).unwrap(), Some(sample_image()));
}

#[test]
fn test_temp_path_appends_suffix() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("remotelist.snapshot");

    assert_eq!(
        temp_path(&path),
        temp.path().join("remotelist.snapshot.tmp")
    );
}
