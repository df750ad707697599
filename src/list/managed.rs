//! Managed list implementation
//!
//! A `Vec<i64>` behind its own RwLock.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ListError, Result};

/// One named, independently lockable sequence of integers
///
/// ## Concurrency:
/// - `get`/`size`: shared lock, any number of concurrent readers
/// - `append`/`remove_last`: exclusive lock, serializes mutations to this
///   list only
pub struct ManagedList {
    /// Identifier this list is registered under
    id: String,

    /// The values, in insertion order
    data: RwLock<Vec<i64>>,
}

impl ManagedList {
    /// Create a new empty list
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_values(id, Vec::new())
    }

    /// Create a list holding `values` (used when restoring a snapshot)
    pub fn with_values(id: impl Into<String>, values: Vec<i64>) -> Self {
        Self {
            id: id.into(),
            data: RwLock::new(values),
        }
    }

    /// Identifier of this list
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Push a value onto the tail (write lock)
    pub fn append(&self, value: i64) {
        self.data.write().push(value);
    }

    /// Pop and return the tail value (write lock)
    pub fn remove_last(&self) -> Result<i64> {
        let mut data = self.data.write();
        data.pop().ok_or_else(|| ListError::EmptyList(self.id.clone()))
    }

    /// Value at `index` (read lock)
    pub fn get(&self, index: i32) -> Result<i64> {
        let data = self.data.read();
        value_at(&data, index)
    }

    /// Number of values (read lock)
    pub fn size(&self) -> i32 {
        clamp_size(self.data.read().len())
    }

    /// Whether the list holds no values
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Deep copy of the current values
    pub fn to_vec(&self) -> Vec<i64> {
        self.data.read().clone()
    }

    /// Take the shared lock and hold it
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<i64>> {
        self.data.read()
    }

    /// Take the exclusive lock and hold it
    ///
    /// Used by the store to keep validate, log and mutate under one guard.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<i64>> {
        self.data.write()
    }
}

/// Bounds-checked lookup
fn value_at(data: &[i64], index: i32) -> Result<i64> {
    usize::try_from(index)
        .ok()
        .and_then(|i| data.get(i).copied())
        .ok_or(ListError::IndexOutOfRange {
            index,
            size: clamp_size(data.len()),
        })
}

/// Sizes travel as i32 on the wire
fn clamp_size(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}
