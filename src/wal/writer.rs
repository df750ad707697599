//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{ListError, Result};
use super::LogRecord;

/// File operations the writer needs from its backing log
///
/// Implemented for `File`. The handle must append: every write lands at the
/// current end of file, including right after `set_len`.
pub trait LogFile: Write + Send {
    /// Flush written data to stable storage
    fn sync_data(&mut self) -> io::Result<()>;

    /// Flush data and metadata (length) to stable storage
    fn sync_all(&mut self) -> io::Result<()>;

    /// Truncate or extend to `len` bytes
    fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// Current length in bytes
    fn len(&self) -> io::Result<u64>;
}

impl LogFile for File {
    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn sync_all(&mut self) -> io::Result<()> {
        File::sync_all(self)
    }

    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

/// Writes records to the WAL file
///
/// The file only ever holds whole, synced records: a record whose write or
/// flush fails is cut off again before `record` returns.
pub struct WalWriter {
    /// Path of the log file
    path: PathBuf,

    /// Log file handle (append mode)
    file: Box<dyn LogFile>,

    /// Length of the log up to the last committed record
    committed_len: u64,

    /// Set when a failed record could not be cut off; refuses further records
    poisoned: bool,

    /// Records written since open or since the last reset
    records_written: u64,
}

impl WalWriter {
    /// Open or create a WAL file for appending
    ///
    /// A log whose last line was torn by a crash gets a newline first, so
    /// the fragment stays a single malformed line instead of swallowing the
    /// next record.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        if has_torn_tail(&mut file)? {
            tracing::warn!("Log {} ends mid-record, terminating it", path.display());
            file.write_all(b"\n")?;
            file.sync_data()?;
        }

        Self::with_file(path, Box::new(file))
    }

    /// Wrap an already opened log file
    ///
    /// The file is taken as is; no torn-tail repair happens here.
    pub fn with_file(path: &Path, file: Box<dyn LogFile>) -> Result<Self> {
        let committed_len = file.len()?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            committed_len,
            poisoned: false,
            records_written: 0,
        })
    }

    /// Append one record and flush it to stable storage
    ///
    /// Returns only after `sync_data` completes. On any failure the log is
    /// truncated back to its last committed length and `Persistence` is
    /// returned; the caller must not apply the mutation in that case. If
    /// even the truncation fails, this writer refuses every later record.
    pub fn record(&mut self, record: &LogRecord) -> Result<()> {
        if self.poisoned {
            return Err(ListError::Persistence(format!(
                "log {} holds an unrecoverable partial record, reopen required",
                self.path.display()
            )));
        }

        let line = record.encode();

        let written = self
            .file
            .write_all(line.as_bytes())
            .map_err(|e| ListError::Persistence(format!("log write failed: {}", e)))
            .and_then(|_| {
                self.file
                    .sync_data()
                    .map_err(|e| ListError::Persistence(format!("log fsync failed: {}", e)))
            });

        if let Err(e) = written {
            self.roll_back();
            return Err(e);
        }

        self.committed_len += line.len() as u64;
        self.records_written += 1;
        Ok(())
    }

    /// Truncate the log to empty and make the truncation durable
    pub fn reset(&mut self) -> Result<()> {
        self.file
            .set_len(0)
            .map_err(|e| ListError::Persistence(format!("log truncate failed: {}", e)))?;
        self.committed_len = 0;
        self.file
            .sync_all()
            .map_err(|e| ListError::Persistence(format!("log fsync failed: {}", e)))?;

        self.records_written = 0;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Records written since open or since the last reset
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Whether a failed rollback left this writer refusing records
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Current length of the log file in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.len()?)
    }

    /// Whether the log file is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cut the log back to `committed_len` after a failed record
    fn roll_back(&mut self) {
        let len = self.committed_len;
        let restored = self.file.set_len(len).and_then(|_| self.file.sync_all());

        if let Err(e) = restored {
            tracing::error!(
                "Cannot truncate log {} back to {} bytes, refusing further records: {}",
                self.path.display(),
                len,
                e
            );
            self.poisoned = true;
        }
    }
}

fn has_torn_tail(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
