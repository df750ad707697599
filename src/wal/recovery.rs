//! WAL Recovery
//!
//! Rebuilds list state by replaying the WAL on top of a loaded snapshot.

use std::path::Path;

use crate::error::{ListError, Result};
use crate::list::ListRegistry;
use super::{LogRecord, WalReader};

/// Handles WAL replay at startup
pub struct WalRecovery;

/// Result of a replay
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Records applied to the registry
    pub records_applied: u64,

    /// Well-formed records that could not be applied (REMOVE on an empty list)
    pub records_skipped: u64,

    /// Lines that did not parse and were ignored
    pub lines_malformed: u64,
}

impl WalRecovery {
    /// Replay every record of the log at `path` into `registry`, in order
    ///
    /// Runs single-threaded before the store starts serving, so the list
    /// locks taken here are never contended.
    /// - `APPEND` pushes the value, creating the list if needed
    /// - `REMOVE` pops the tail if the list is non-empty, otherwise it is
    ///   logged and ignored
    /// - malformed lines are logged and ignored
    ///
    /// A missing file replays nothing. Only a real I/O error aborts.
    pub fn replay(path: &Path, registry: &ListRegistry) -> Result<RecoveryResult> {
        let mut result = RecoveryResult::default();

        if !path.exists() {
            return Ok(result);
        }

        let mut reader = WalReader::open(path)?;
        while let Some(next) = reader.next_record() {
            let record = match next {
                Ok(record) => record,
                Err(ListError::MalformedLogRecord(reason)) => {
                    tracing::warn!(
                        line = reader.line_number(),
                        "Skipping malformed log record: {}",
                        reason
                    );
                    result.lines_malformed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let list = registry.resolve_or_create(record.list_id());
            match record {
                LogRecord::Append { value, .. } => {
                    list.append(value);
                    result.records_applied += 1;
                }
                LogRecord::Remove { list_id } => {
                    if list.remove_last().is_ok() {
                        result.records_applied += 1;
                    } else {
                        tracing::warn!(
                            line = reader.line_number(),
                            "Ignoring REMOVE on empty list '{}'",
                            list_id
                        );
                        result.records_skipped += 1;
                    }
                }
            }
        }

        Ok(result)
    }
}
