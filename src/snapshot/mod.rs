//! Snapshot Module
//!
//! Point-in-time images of all lists, used to bound WAL replay.
//!
//! ## Responsibilities
//! - Encode/decode the full list state with a checksum
//! - Replace the snapshot file atomically (temp file + fsync + rename)
//! - Run snapshot cycles periodically in the background
//!
//! The freeze-and-cut protocol itself lives in `Store::snapshot`, since it
//! needs the store's log and list locks.
//!
//! ## File Format
//! ```text
//! ┌───────────┬─────────────┬───────────┬──────────┬──────────────────────┐
//! │ Magic (4) │ Version (2) │ CRC32 (4) │ Len (8)  │ bincode payload      │
//! │  "RLSN"   │             │ (payload) │          │ BTreeMap<id, [i64]>  │
//! └───────────┴─────────────┴───────────┴──────────┴──────────────────────┘
//! ```

mod image;
mod scheduler;

pub use image::{
    load, temp_path, write_atomic, SnapshotImage, SNAPSHOT_HEADER_SIZE, SNAPSHOT_MAGIC,
    SNAPSHOT_VERSION,
};
pub use scheduler::SnapshotScheduler;

/// Outcome of one snapshot cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Lists captured
    pub lists: usize,

    /// Values captured across all lists
    pub values: usize,

    /// Size of the written snapshot file
    pub bytes: u64,
}
