//! WAL Reader
//!
//! Handles reading records from the WAL file.

use std::fs::File;
use std::io::{BufRead, BufReader, Split};
use std::path::Path;

use crate::error::{ListError, Result};
use super::LogRecord;

/// Reads records from the WAL file, one line at a time
pub struct WalReader {
    lines: Split<BufReader<File>>,

    /// 1-based number of the last line handed out
    line_number: u64,
}

impl WalReader {
    /// Open a WAL file for reading from the beginning
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).split(b'\n'),
            line_number: 0,
        })
    }

    /// Read the next record
    ///
    /// Returns `None` at end of file. Blank lines are skipped. An unparsable
    /// line (bad fields or invalid UTF-8) yields `MalformedLogRecord` and the
    /// reader stays usable for the lines after it. A real I/O error is
    /// returned as `Io`.
    pub fn next_record(&mut self) -> Option<Result<LogRecord>> {
        loop {
            let raw = match self.lines.next()? {
                Ok(raw) => raw,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(_) => {
                    return Some(Err(ListError::MalformedLogRecord(format!(
                        "line {} is not valid UTF-8",
                        self.line_number
                    ))))
                }
            };

            if line.trim().is_empty() {
                continue;
            }
            return Some(LogRecord::parse(&line));
        }
    }

    /// Line number of the most recently returned record
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

impl Iterator for WalReader {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}
