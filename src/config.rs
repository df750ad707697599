//! Configuration for remotelist
//!
//! One `Config` value drives a whole instance: where state lives, how often
//! it is snapshotted, and how the TCP front end behaves.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ListError, Result};

/// Write-ahead log file name inside `data_dir`
pub const LOG_FILENAME: &str = "remotelist.log";

/// Snapshot file name inside `data_dir`
pub const SNAPSHOT_FILENAME: &str = "remotelist.snapshot";

/// Settings for a remotelist instance
///
/// ```text
/// {data_dir}/
///   ├── remotelist.log        text WAL, one record per line
///   └── remotelist.snapshot   latest binary snapshot
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the log and the snapshot (created on open)
    pub data_dir: PathBuf,

    /// Time between background snapshot cycles
    pub snapshot_interval: Duration,

    /// Address the server binds, `host:port`
    pub listen_addr: String,

    /// Connections served at once; extra ones get an ERROR reply
    pub max_connections: usize,

    /// Idle read timeout per connection in ms (0 = wait forever)
    pub read_timeout_ms: u64,

    /// Write timeout per connection in ms (0 = wait forever)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./remotelist_data"),
            snapshot_interval: Duration::from_secs(30),
            listen_addr: "127.0.0.1:5000".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Start from the defaults
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the write-ahead log
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILENAME)
    }

    /// Full path of the snapshot file
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILENAME)
    }

    /// Reject settings the store cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_interval.is_zero() {
            return Err(ListError::Config(
                "snapshot_interval must be greater than zero".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ListError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ListError::Config("data_dir must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Fluent construction of a `Config`
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn snapshot_interval(mut self, interval: Duration) -> Self {
        self.config.snapshot_interval = interval;
        self
    }

    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn max_connections(mut self, limit: usize) -> Self {
        self.config.max_connections = limit;
        self
    }

    /// 0 disables the timeout
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// 0 disables the timeout
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Finish without validating (`Store::open` validates)
    pub fn build(self) -> Config {
        self.config
    }
}
