//! Reader-writer lock strategy.
//!
//! `get` takes a shared guard, `set` an exclusive one, via
//! `parking_lot::RwLock`. Any number of readers proceed together; a writer
//! waits for them to leave and excludes new ones while it runs. A `get`
//! that starts after a `set` has returned observes that write.
//!
//! ```text
//!   readers ──► [ shared ]──[ shared ]──┐      ┌──[ shared ]──►
//!                                       ▼      │
//!   writer  ─────────────────────► [ exclusive ]────────────────►
//! ```

use std::hash::Hash;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::traits::CacheStore;

/// Cache guarded by a reader-writer lock. Favours read-heavy workloads.
#[derive(Debug)]
pub struct RwLockCache<K, V> {
    table: RwLock<FxHashMap<K, V>>,
}

impl<K, V> RwLockCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for RwLockCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStore<K, V> for RwLockCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    #[inline]
    fn get(&self, key: &K) -> Option<V> {
        self.table.read().get(key).cloned()
    }

    #[inline]
    fn set(&self, key: K, value: V) {
        self.table.write().insert(key, value);
    }

    fn label(&self) -> &'static str {
        "RW Lock"
    }
}
