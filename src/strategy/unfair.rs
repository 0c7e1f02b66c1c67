//! Low-overhead exclusive-lock strategy.
//!
//! Uses `parking_lot::Mutex`: an uncontended acquire is a single CAS, a
//! contended one spins briefly before parking. Waiters are not served in
//! FIFO order; a thread releasing the lock may barge straight back in. That
//! suits the tiny critical sections of a hash-map lookup.
//!
//! Ordering is identical to [`MutexCache`](super::mutex::MutexCache): all
//! operations on one instance are totally ordered.

use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::traits::CacheStore;

/// Cache guarded by an unfair spin-then-park lock.
#[derive(Debug)]
pub struct UnfairLockCache<K, V> {
    table: Mutex<FxHashMap<K, V>>,
}

impl<K, V> UnfairLockCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Mutex::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for UnfairLockCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStore<K, V> for UnfairLockCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    #[inline]
    fn get(&self, key: &K) -> Option<V> {
        self.table.lock().get(key).cloned()
    }

    #[inline]
    fn set(&self, key: K, value: V) {
        self.table.lock().insert(key, value);
    }

    fn label(&self) -> &'static str {
        "Unfair Lock"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn concurrent_writers_on_disjoint_keys_are_all_visible() {
        let cache = Arc::new(UnfairLockCache::new());
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500u64 {
                        cache.set(t * 1_000 + i, i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8 * 500);
        assert_eq!(cache.get(&3_499), Some(499));
    }
}
