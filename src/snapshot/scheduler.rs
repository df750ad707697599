//! Snapshot scheduler
//!
//! Background thread that drives `Store::snapshot` at a fixed interval.

use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Sender};

use crate::error::Result;
use crate::store::Store;

/// Periodic snapshot job owned by a store
///
/// Holds only a `Weak<Store>`: the job never keeps a store alive, and exits
/// on its next tick once the store is gone. Dropping the scheduler stops it.
pub struct SnapshotScheduler {
    /// Dropping this sender disconnects the worker's shutdown channel
    shutdown_tx: Option<Sender<()>>,

    /// Worker thread
    handle: Option<JoinHandle<()>>,
}

impl SnapshotScheduler {
    /// Spawn the worker, taking a snapshot every `interval`
    pub fn start(store: Weak<Store>, interval: Duration) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
        let ticker = channel::tick(interval);

        let handle = thread::Builder::new()
            .name("snapshot-scheduler".to_string())
            .spawn(move || {
                tracing::debug!("Snapshot scheduler started (interval {:?})", interval);

                loop {
                    channel::select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            let Some(store) = store.upgrade() else {
                                break;
                            };

                            tracing::info!("Starting snapshot cycle");
                            match store.snapshot() {
                                Ok(stats) => tracing::info!(
                                    lists = stats.lists,
                                    values = stats.values,
                                    bytes = stats.bytes,
                                    "Snapshot written"
                                ),
                                Err(e) => tracing::error!("Snapshot failed: {}", e),
                            }
                        }
                    }
                }

                tracing::debug!("Snapshot scheduler stopped");
            })?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Stop the worker and wait for it to exit
    ///
    /// A cycle already in progress runs to completion first.
    pub fn stop(&mut self) {
        self.shutdown_tx.take();

        if let Some(handle) = self.handle.take() {
            // The last `Arc<Store>` can be released by the worker itself, in
            // which case we are running on it and must not join.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }

    /// Whether the worker thread is still running
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SnapshotScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
