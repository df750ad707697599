//! WAL record definitions
//!
//! Defines the operations recorded in the log and their line encoding.

use crate::error::{ListError, Result};

/// Keyword for an append record
pub const APPEND_KEYWORD: &str = "APPEND";

/// Keyword for a remove record
pub const REMOVE_KEYWORD: &str = "REMOVE";

/// A single mutation recorded in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// Push `value` onto the tail of `list_id`
    Append { list_id: String, value: i64 },

    /// Pop the tail of `list_id`
    Remove { list_id: String },
}

impl LogRecord {
    /// Identifier of the list this record mutates
    pub fn list_id(&self) -> &str {
        match self {
            LogRecord::Append { list_id, .. } => list_id,
            LogRecord::Remove { list_id } => list_id,
        }
    }

    /// Encode as a single log line, including the trailing newline
    pub fn encode(&self) -> String {
        match self {
            LogRecord::Append { list_id, value } => {
                format!("{} {} {}\n", APPEND_KEYWORD, list_id, value)
            }
            LogRecord::Remove { list_id } => format!("{} {}\n", REMOVE_KEYWORD, list_id),
        }
    }

    /// Parse one log line (with or without its newline)
    ///
    /// Fields are whitespace-delimited. Anything that is not exactly
    /// `APPEND <id> <i64>` or `REMOVE <id>` is a `MalformedLogRecord`.
    pub fn parse(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();

        let op = fields
            .next()
            .ok_or_else(|| ListError::MalformedLogRecord("empty line".to_string()))?;
        let list_id = fields
            .next()
            .ok_or_else(|| ListError::MalformedLogRecord(format!("missing list id: {:?}", line)))?
            .to_string();

        let record = match op {
            APPEND_KEYWORD => {
                let raw = fields.next().ok_or_else(|| {
                    ListError::MalformedLogRecord(format!("APPEND without value: {:?}", line))
                })?;
                let value = raw.parse::<i64>().map_err(|_| {
                    ListError::MalformedLogRecord(format!("invalid APPEND value: {:?}", line))
                })?;
                LogRecord::Append { list_id, value }
            }
            REMOVE_KEYWORD => LogRecord::Remove { list_id },
            other => {
                return Err(ListError::MalformedLogRecord(format!(
                    "unknown operation {:?}",
                    other
                )))
            }
        };

        if fields.next().is_some() {
            return Err(ListError::MalformedLogRecord(format!(
                "trailing fields: {:?}",
                line
            )));
        }

        Ok(record)
    }
}

/// Check that `list_id` can be written to the whitespace-delimited log
pub fn validate_list_id(list_id: &str) -> Result<()> {
    if list_id.is_empty() || list_id.chars().any(char::is_whitespace) {
        return Err(ListError::InvalidListId(list_id.to_string()));
    }
    Ok(())
}
