//! List registry
//!
//! Maps list identifiers to their `ManagedList`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::ManagedList;

/// Registry of all lists known to a store
///
/// ## Concurrency:
/// - `lists`: RwLock over the map only; the lists themselves carry their
///   own locks, so holding a list never requires holding the registry
/// - Lists are created lazily and never removed
pub struct ListRegistry {
    lists: RwLock<HashMap<String, Arc<ManagedList>>>,
}

impl ListRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(HashMap::new()),
        }
    }

    /// Build a registry from restored state (startup only, no contention)
    pub fn from_lists<I>(lists: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<i64>)>,
    {
        let map = lists
            .into_iter()
            .map(|(id, values)| {
                let list = Arc::new(ManagedList::with_values(id.clone(), values));
                (id, list)
            })
            .collect();

        Self {
            lists: RwLock::new(map),
        }
    }

    /// Look up a list without creating it
    pub fn resolve(&self, id: &str) -> Option<Arc<ManagedList>> {
        self.lists.read().get(id).cloned()
    }

    /// Look up a list, creating an empty one if absent
    ///
    /// Optimistic read-lock lookup first. On a miss the write lock is taken
    /// and the map re-checked, since another caller may have created the
    /// list while we waited.
    pub fn resolve_or_create(&self, id: &str) -> Arc<ManagedList> {
        if let Some(list) = self.resolve(id) {
            return list;
        }

        let mut lists = self.lists.write();
        if let Some(list) = lists.get(id) {
            return Arc::clone(list);
        }

        let list = Arc::new(ManagedList::new(id));
        lists.insert(id.to_string(), Arc::clone(&list));
        tracing::debug!("List '{}' created", id);
        list
    }

    /// Snapshot of the current (id, list) pairs
    ///
    /// The read lock is released before returning; lists created afterwards
    /// are not included.
    pub fn lists(&self) -> Vec<(String, Arc<ManagedList>)> {
        self.lists
            .read()
            .iter()
            .map(|(id, list)| (id.clone(), Arc::clone(list)))
            .collect()
    }

    /// Number of lists
    pub fn len(&self) -> usize {
        self.lists.read().len()
    }

    /// Whether no list exists yet
    pub fn is_empty(&self) -> bool {
        self.lists.read().is_empty()
    }
}

impl Default for ListRegistry {
    fn default() -> Self {
        Self::new()
    }
}
