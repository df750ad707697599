//! Store Module
//!
//! The facade that composes the list registry, the WAL and the snapshot
//! engine. This is what the network layer calls.
//!
//! ## Responsibilities
//! - Append/Get/Remove/Size with durability-before-memory ordering
//! - Freeze-and-cut snapshot cycles that compact the WAL
//! - Crash recovery on startup (snapshot load + WAL replay)
//! - Own the background snapshot scheduler

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{ListError, Result};
use crate::list::ListRegistry;
use crate::protocol::{AppendReply, Command, GetReply, RemoveReply, Reply, SizeReply};
use crate::snapshot::{self, SnapshotImage, SnapshotScheduler, SnapshotStats};
use crate::wal::{validate_list_id, LogRecord, RecoveryResult, WalRecovery, WalWriter};

/// The list store
///
/// ## Lock Order
///
/// Every path that takes more than one lock takes them in this order:
///
/// ```text
/// snapshot_lock → wal → registry → list
/// ```
///
/// - **Append**: wal → registry (lookup/create) → list (write)
/// - **Remove**: wal → registry (lookup) → list (write)
/// - **Snapshot**: snapshot_lock → wal → registry (enumerate) → lists (read)
/// - **Get/Size**: registry → list (read), never the wal
///
/// Holding the wal lock across validate + record + mutate gives every
/// mutation a single global order, and makes per-list memory order equal to
/// log order. Lists only gain values under the wal lock, so an enumeration
/// done while holding it sees every list that has a committed record.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Path of the write-ahead log
    log_path: PathBuf,

    /// Path of the snapshot file
    snapshot_path: PathBuf,

    /// All lists (internal RwLock on the map, one RwLock per list)
    registry: ListRegistry,

    /// Write-ahead log (exclusive access, one record in flight)
    wal: Mutex<WalWriter>,

    /// Serializes snapshot cycles (they share the temp file)
    snapshot_lock: Mutex<()>,

    /// Background snapshot job, if started
    scheduler: Mutex<Option<SnapshotScheduler>>,

    /// What the startup replay did
    recovery: RecoveryResult,
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Load the last snapshot (missing or corrupt ⇒ start empty)
    /// 3. Open the WAL for append (failure is fatal)
    /// 4. Replay the WAL on top of the snapshot
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_log(config, WalWriter::open)
    }

    /// Like `open`, with `open_log` producing the writer for the log path
    ///
    /// Lets callers put the log on something other than a plain `File`
    /// (see `LogFile`). Replay still reads the file at the log path.
    pub fn open_with_log<F>(config: Config, open_log: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> Result<WalWriter>,
    {
        config.validate()?;

        // Step 1: Data directory
        fs::create_dir_all(&config.data_dir).map_err(|e| {
            ListError::StartupPersistence(format!(
                "cannot create data directory {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;

        let log_path = config.log_path();
        let snapshot_path = config.snapshot_path();

        // A temp file means a snapshot cycle died before its rename
        let stale = snapshot::temp_path(&snapshot_path);
        if stale.exists() {
            tracing::warn!("Removing incomplete snapshot {}", stale.display());
            if let Err(e) = fs::remove_file(&stale) {
                tracing::warn!("Cannot remove {}: {}", stale.display(), e);
            }
        }

        // Step 2: Snapshot
        let image = match snapshot::load(&snapshot_path) {
            Ok(Some(image)) => {
                tracing::info!(
                    lists = image.list_count(),
                    values = image.value_count(),
                    "Snapshot loaded"
                );
                image
            }
            Ok(None) => {
                tracing::info!("No snapshot found, starting from the log alone");
                SnapshotImage::new()
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable snapshot: {}", e);
                SnapshotImage::new()
            }
        };
        let registry = ListRegistry::from_lists(image.lists);

        // Step 3: WAL
        let wal = open_log(&log_path).map_err(|e| {
            ListError::StartupPersistence(format!(
                "cannot open log {}: {}",
                log_path.display(),
                e
            ))
        })?;

        // Step 4: Replay
        let recovery = WalRecovery::replay(&log_path, &registry).map_err(|e| {
            ListError::StartupPersistence(format!(
                "cannot replay log {}: {}",
                log_path.display(),
                e
            ))
        })?;

        tracing::info!(
            applied = recovery.records_applied,
            skipped = recovery.records_skipped,
            malformed = recovery.lines_malformed,
            lists = registry.len(),
            "Log replay complete"
        );

        Ok(Self {
            config,
            log_path,
            snapshot_path,
            registry,
            wal: Mutex::new(wal),
            snapshot_lock: Mutex::new(()),
            scheduler: Mutex::new(None),
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::Append { list_id, value } => self.append(&list_id, value).map(Reply::Append),
            Command::Get { list_id, index } => self.get(&list_id, index).map(Reply::Get),
            Command::Remove { list_id } => self.remove(&list_id).map(Reply::Remove),
            Command::Size { list_id } => Ok(Reply::Size(self.size(&list_id))),
            Command::Ping => Ok(Reply::Pong),
        }
    }

    // =========================================================================
    // List Operations
    // =========================================================================

    /// Append a value to the tail of a list, creating the list if needed
    ///
    /// Steps:
    /// 1. Acquire the WAL lock
    /// 2. Lock the list for writing (if it exists)
    /// 3. Record the APPEND durably
    /// 4. Push the value (creating the list now if it did not exist)
    ///
    /// If step 3 fails nothing in memory changes, not even list creation.
    pub fn append(&self, list_id: &str, value: i64) -> Result<AppendReply> {
        validate_list_id(list_id)?;
        let record = LogRecord::Append {
            list_id: list_id.to_string(),
            value,
        };

        let mut wal = self.wal.lock();

        match self.registry.resolve(list_id) {
            Some(list) => {
                let mut data = list.write();
                wal.record(&record)?;
                data.push(value);
            }
            None => {
                wal.record(&record)?;
                self.registry.resolve_or_create(list_id).append(value);
            }
        }

        Ok(AppendReply { success: true })
    }

    /// Value at `index` of a list
    pub fn get(&self, list_id: &str, index: i32) -> Result<GetReply> {
        let list = self
            .registry
            .resolve(list_id)
            .ok_or_else(|| ListError::ListNotFound(list_id.to_string()))?;

        let value = list.get(index)?;
        Ok(GetReply { value })
    }

    /// Remove and return the tail value of a list
    ///
    /// Steps:
    /// 1. Acquire the WAL lock
    /// 2. Resolve and write-lock the list
    /// 3. Fail with `EmptyList` before logging anything if it is empty
    /// 4. Record the REMOVE durably
    /// 5. Pop the value
    pub fn remove(&self, list_id: &str) -> Result<RemoveReply> {
        let mut wal = self.wal.lock();

        let list = self
            .registry
            .resolve(list_id)
            .ok_or_else(|| ListError::ListNotFound(list_id.to_string()))?;
        let mut data = list.write();

        let value = *data
            .last()
            .ok_or_else(|| ListError::EmptyList(list_id.to_string()))?;

        wal.record(&LogRecord::Remove {
            list_id: list_id.to_string(),
        })?;
        data.pop();

        Ok(RemoveReply { value })
    }

    /// Number of values in a list (0 if the list does not exist)
    pub fn size(&self, list_id: &str) -> SizeReply {
        let size = self
            .registry
            .resolve(list_id)
            .map(|list| list.size())
            .unwrap_or(0);
        SizeReply { size }
    }

    /// Copy of a whole list, `None` if it does not exist
    pub fn values(&self, list_id: &str) -> Option<Vec<i64>> {
        self.registry.resolve(list_id).map(|list| list.to_vec())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Run one snapshot cycle
    ///
    /// 1. Enumerate: collect (id, list) pairs under the registry read lock
    /// 2. Freeze & cut: with the WAL lock held, read-lock every collected
    ///    list, deep-copy it, then reset the WAL. The reset is the commit
    ///    point: from here the image stands for "log is empty".
    /// 3. Persist: with no store locks held, write the image atomically
    ///
    /// A crash after step 2 and before the rename in step 3 loses the
    /// records truncated in step 2; the previous snapshot stays intact.
    pub fn snapshot(&self) -> Result<SnapshotStats> {
        let _cycle = self.snapshot_lock.lock();

        let image = {
            let mut wal = self.wal.lock();

            // Phase 1: enumerate
            let lists = self.registry.lists();

            // Phase 2: freeze, copy, cut
            let frozen: Vec<_> = lists.iter().map(|(id, list)| (id, list.read())).collect();
            let image: SnapshotImage = frozen
                .iter()
                .map(|(id, data)| (id.to_string(), data.to_vec()))
                .collect();

            wal.reset()?;
            drop(frozen);
            image
        };

        // Phase 3: persist
        let bytes = snapshot::write_atomic(&self.snapshot_path, &image)?;

        Ok(SnapshotStats {
            lists: image.list_count(),
            values: image.value_count(),
            bytes,
        })
    }

    /// Start the background snapshot job at `config.snapshot_interval`
    ///
    /// Replaces (and stops) any job already running.
    pub fn start_snapshots(self: &Arc<Self>) -> Result<()> {
        let scheduler =
            SnapshotScheduler::start(Arc::downgrade(self), self.config.snapshot_interval)?;

        let previous = self.scheduler.lock().replace(scheduler);
        drop(previous);
        Ok(())
    }

    /// Whether the background snapshot job is running
    pub fn snapshots_running(&self) -> bool {
        self.scheduler
            .lock()
            .as_ref()
            .map(SnapshotScheduler::is_running)
            .unwrap_or(false)
    }

    /// Stop background work and sync the log
    ///
    /// The store stays usable; only the scheduler is gone.
    pub fn shutdown(&self) -> Result<()> {
        let scheduler = self.scheduler.lock().take();
        drop(scheduler);

        self.wal.lock().sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL path
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Get the snapshot path
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Number of lists
    pub fn list_count(&self) -> usize {
        self.registry.len()
    }

    /// Records committed to the WAL since open or the last snapshot
    pub fn log_records(&self) -> u64 {
        self.wal.lock().records_written()
    }

    /// False once a failed record could not be cut from the log
    pub fn log_writable(&self) -> bool {
        !self.wal.lock().is_poisoned()
    }

    /// Total values across all lists
    pub fn value_count(&self) -> usize {
        self.registry
            .lists()
            .iter()
            .map(|(_, list)| list.size() as usize)
            .sum()
    }

    /// What the startup replay did
    pub fn recovery_result(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
