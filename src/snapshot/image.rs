//! Snapshot image
//!
//! Serialization of the full list state and its atomic on-disk replacement.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ListError, Result};

/// Magic number identifying snapshot files ("RLSN")
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"RLSN";

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u16 = 1;

/// Header size: magic (4) + version (2) + crc (4) + payload length (8)
pub const SNAPSHOT_HEADER_SIZE: usize = 18;

/// Point-in-time copy of every list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotImage {
    /// list id -> values in insertion order
    pub lists: BTreeMap<String, Vec<i64>>,
}

impl SnapshotImage {
    /// Create an empty image
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lists in the image
    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Total number of values across all lists
    pub fn value_count(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Encode header + bincode payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload =
            bincode::serialize(&self.lists).map_err(|e| ListError::Serialization(e.to_string()))?;
        let crc = crc32fast::hash(&payload);

        let mut bytes = Vec::with_capacity(SNAPSHOT_HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_be_bytes());
        bytes.extend_from_slice(&crc.to_be_bytes());
        bytes.extend_from_slice(&(payload.len() as u64).to_be_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode and verify an encoded image
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SNAPSHOT_HEADER_SIZE {
            return Err(ListError::SnapshotCorruption(format!(
                "file too short: {} bytes",
                bytes.len()
            )));
        }

        if bytes[0..4] != SNAPSHOT_MAGIC {
            return Err(ListError::SnapshotCorruption("bad magic number".to_string()));
        }

        let version = u16::from_be_bytes([bytes[4], bytes[5]]);
        if version != SNAPSHOT_VERSION {
            return Err(ListError::SnapshotCorruption(format!(
                "unsupported version {}",
                version
            )));
        }

        let stored_crc = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&bytes[10..18]);
        let payload_len = u64::from_be_bytes(len_bytes);

        let payload = &bytes[SNAPSHOT_HEADER_SIZE..];
        if payload.len() as u64 != payload_len {
            return Err(ListError::SnapshotCorruption(format!(
                "payload length mismatch: header says {}, file has {}",
                payload_len,
                payload.len()
            )));
        }

        let actual_crc = crc32fast::hash(payload);
        if actual_crc != stored_crc {
            return Err(ListError::SnapshotCorruption(format!(
                "CRC mismatch: expected {:08x}, got {:08x}",
                stored_crc, actual_crc
            )));
        }

        let lists =
            bincode::deserialize(payload).map_err(|e| ListError::Serialization(e.to_string()))?;
        Ok(Self { lists })
    }
}

impl FromIterator<(String, Vec<i64>)> for SnapshotImage {
    fn from_iter<I: IntoIterator<Item = (String, Vec<i64>)>>(iter: I) -> Self {
        Self {
            lists: iter.into_iter().collect(),
        }
    }
}

/// Path of the temporary file a snapshot is staged in
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Load the snapshot at `path`
///
/// Returns `Ok(None)` if no snapshot exists.
pub fn load(path: &Path) -> Result<Option<SnapshotImage>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    SnapshotImage::decode(&bytes).map(Some)
}

/// Write `image` to `path` atomically
///
/// Steps:
/// 1. Write the encoded image to `<path>.tmp`
/// 2. fsync the temp file
/// 3. Rename it over `path`
/// 4. fsync the parent directory so the rename itself is durable
///
/// On failure the temp file is removed and any previous snapshot is left
/// untouched. Returns the number of bytes written.
pub fn write_atomic(path: &Path, image: &SnapshotImage) -> Result<u64> {
    let bytes = image.encode()?;
    let tmp = temp_path(path);

    if let Err(e) = write_and_sync(&tmp, &bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(ListError::Persistence(format!(
            "snapshot write to {} failed: {}",
            path.display(),
            e
        )));
    }

    if let Some(dir) = path.parent() {
        sync_dir(dir)?;
    }

    Ok(bytes.len() as u64)
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

// Directories cannot be opened as files on Windows.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
