//! Log failure tests
//!
//! Tests verify:
//! - A mutation whose log record fails leaves memory untouched
//! - A failed record leaves nothing behind in the log, so later records
//!   replay normally
//! - A writer that cannot clean up after a failure refuses further records

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use remotelist::wal::{LogFile, WalWriter};
use remotelist::{Config, ListError, Store};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Failures to inject into the next log operations
#[derive(Default)]
struct Faults {
    /// Bytes that still fit before writes fail with "disk full"
    room: Option<usize>,

    /// `sync_data` fails
    fail_sync: bool,

    /// `set_len` fails
    fail_truncate: bool,
}

/// A real log file that fails on demand
struct FaultyLog {
    file: File,
    faults: Arc<Mutex<Faults>>,
}

impl Write for FaultyLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut faults = self.faults.lock();
        match faults.room {
            None => self.file.write(buf),
            Some(0) => Err(io::Error::new(ErrorKind::Other, "no space left on device")),
            Some(room) => {
                let n = self.file.write(&buf[..buf.len().min(room)])?;
                faults.room = Some(room - n);
                Ok(n)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl LogFile for FaultyLog {
    fn sync_data(&mut self) -> io::Result<()> {
        if self.faults.lock().fail_sync {
            return Err(io::Error::new(ErrorKind::Other, "fsync failed"));
        }
        self.file.sync_data()
    }

    fn sync_all(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn set_len(&mut self, len: u64) -> io::Result<()> {
        if self.faults.lock().fail_truncate {
            return Err(io::Error::new(ErrorKind::Other, "truncate failed"));
        }
        self.file.set_len(len)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}

fn open_faulty_store(temp: &TempDir) -> (Store, Arc<Mutex<Faults>>) {
    let faults = Arc::new(Mutex::new(Faults::default()));
    let handle = Arc::clone(&faults);
    let config = Config::builder().data_dir(temp.path()).build();

    let store = Store::open_with_log(config, move |path| {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;
        WalWriter::with_file(path, Box::new(FaultyLog { file, faults: handle }))
    })
    .unwrap();

    (store, faults)
}

fn clear(faults: &Mutex<Faults>) {
    *faults.lock() = Faults::default();
}

// =============================================================================
// Memory Consistency Tests
// =============================================================================

#[test]
fn test_failed_record_leaves_memory_unchanged() {
    let temp = TempDir::new().unwrap();
    let (store, faults) = open_faulty_store(&temp);
    store.append("A", 1).unwrap();

    faults.lock().room = Some(4);

    assert!(matches!(store.append("A", 2), Err(ListError::Persistence(_))));
    assert_eq!(store.values("A"), Some(vec![1]));
    assert_eq!(store.size("A").size, 1);

    // A failed first append does not create the list
    assert!(matches!(store.append("B", 7), Err(ListError::Persistence(_))));
    assert_eq!(store.values("B"), None);
    assert_eq!(store.list_count(), 1);

    assert!(matches!(store.remove("A"), Err(ListError::Persistence(_))));
    assert_eq!(store.values("A"), Some(vec![1]));

    assert_eq!(store.log_records(), 1);
    assert_eq!(fs::read_to_string(store.log_path()).unwrap(), "APPEND A 1\n");
}

// =============================================================================
// Log Consistency Tests
// =============================================================================

#[test]
fn test_record_after_partial_write_survives_restart() {
    let temp = TempDir::new().unwrap();
    {
        let (store, faults) = open_faulty_store(&temp);
        store.append("A", 1).unwrap();

        faults.lock().room = Some(4);
        assert!(store.append("A", 2).is_err());
        clear(&faults);

        store.append("A", 3).unwrap();
        store.append("B", 2).unwrap();
        assert_eq!(
            fs::read_to_string(store.log_path()).unwrap(),
            "APPEND A 1\nAPPEND A 3\nAPPEND B 2\n"
        );
    }

    let store = Store::open_path(temp.path()).unwrap();

    assert_eq!(store.values("A"), Some(vec![1, 3]));
    assert_eq!(store.values("B"), Some(vec![2]));
    assert_eq!(store.recovery_result().lines_malformed, 0);
}

#[test]
fn test_record_with_failed_sync_is_not_replayed() {
    let temp = TempDir::new().unwrap();
    {
        let (store, faults) = open_faulty_store(&temp);

        faults.lock().fail_sync = true;
        assert!(matches!(store.append("A", 1), Err(ListError::Persistence(_))));
        assert_eq!(store.values("A"), None);
        clear(&faults);

        store.append("A", 2).unwrap();
    }

    let store = Store::open_path(temp.path()).unwrap();

    assert_eq!(store.values("A"), Some(vec![2]));
    assert_eq!(store.recovery_result().records_applied, 1);
}

#[test]
fn test_failed_cleanup_refuses_later_records() {
    let temp = TempDir::new().unwrap();
    {
        let (store, faults) = open_faulty_store(&temp);

        {
            let mut faults = faults.lock();
            faults.room = Some(4);
            faults.fail_truncate = true;
        }
        assert!(store.append("A", 1).is_err());
        assert!(!store.log_writable());

        // Disk recovered, but the fragment is still in the log
        clear(&faults);
        assert!(matches!(store.append("A", 2), Err(ListError::Persistence(_))));
        assert_eq!(store.values("A"), None);
    }

    // Reopening terminates the fragment and accepts records again
    let store = Store::open_path(temp.path()).unwrap();
    assert_eq!(store.recovery_result().lines_malformed, 1);
    assert!(store.log_writable());
    store.append("A", 3).unwrap();
    drop(store);

    let store = Store::open_path(temp.path()).unwrap();
    assert_eq!(store.values("A"), Some(vec![3]));
}
