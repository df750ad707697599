//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Record every mutation before it is applied in memory
//! - fsync after each record (a mutation is committed once its line is durable)
//! - Reset to empty at the snapshot commit point
//! - Replay on startup, tolerating malformed lines
//!
//! ## File Format
//! UTF-8 text, one record per line, whitespace-delimited fields:
//! ```text
//! APPEND <list_id> <value>
//! REMOVE <list_id>
//! ```

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{LogRecord, validate_list_id, APPEND_KEYWORD, REMOVE_KEYWORD};
pub use writer::{LogFile, WalWriter};
pub use reader::WalReader;
pub use recovery::{WalRecovery, RecoveryResult};
