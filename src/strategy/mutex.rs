//! Blocking exclusive-lock strategy.
//!
//! The whole table sits behind one `std::sync::Mutex`. Every `get` and `set`
//! takes the lock, so all operations on an instance are totally ordered. This
//! is the baseline the other strategies are compared against.
//!
//! A panic while the lock is held poisons it; the table itself is never left
//! half-updated by `HashMap::insert`, so the guard is recovered and used.

use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;

use crate::traits::CacheStore;

/// Cache guarded by an OS mutex.
///
/// # Example
///
/// ```
/// use syncbench::strategy::mutex::MutexCache;
/// use syncbench::traits::CacheStore;
///
/// let cache = MutexCache::new();
/// cache.set("a", 1);
/// cache.set("a", 2);
/// assert_eq!(cache.get(&"a"), Some(2));
/// ```
#[derive(Debug)]
pub struct MutexCache<K, V> {
    table: Mutex<FxHashMap<K, V>>,
}

impl<K, V> MutexCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty cache with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Mutex::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, FxHashMap<K, V>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> Default for MutexCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStore<K, V> for MutexCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    #[inline]
    fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    #[inline]
    fn set(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    fn label(&self) -> &'static str {
        "Mutex"
    }
}
