//! Per-key async mutual exclusion.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Table of async locks, one per key, created on demand.
///
/// A key's entry is removed as soon as no task holds or waits for its lock,
/// so the table only grows with the number of keys in active use.
#[derive(Debug)]
pub struct KeyedLocks<K: Eq + Hash + Clone> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: K) -> KeyedGuard<'_, K> {
        let mutex = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        KeyedGuard {
            table: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn release(&self, key: &K) {
        self.locks.remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to one key; released on drop.
pub struct KeyedGuard<'a, K: Eq + Hash + Clone> {
    table: &'a KeyedLocks<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> Drop for KeyedGuard<'_, K> {
    fn drop(&mut self) {
        self.guard.take();
        self.table.release(&self.key);
    }
}
