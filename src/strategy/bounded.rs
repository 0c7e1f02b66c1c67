//! Bounded eviction strategy.
//!
//! Memory is capped at a fixed number of entries. Overflow evicts the least
//! recently used entry; `get` counts as a use. Thread safety is delegated to
//! [`ConcurrentLru`], so this type adds nothing but the contract.
//!
//! Unlike the other strategies, a `get` may return `None` for a key that was
//! set and never removed, once capacity pressure has evicted it. While the
//! number of distinct keys stays within capacity it behaves like an
//! exclusive-lock cache.

use std::hash::Hash;

use crate::ds::lru::ConcurrentLru;
use crate::error::ConfigError;
use crate::traits::CacheStore;

/// Default entry capacity; large enough that the standard scenarios never evict.
pub const DEFAULT_CAPACITY: usize = 4096;

/// LRU-evicting cache with a fixed capacity.
pub struct BoundedCache<K, V> {
    store: ConcurrentLru<K, V>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("bounded cache capacity must be > 0"));
        }
        Ok(Self {
            store: ConcurrentLru::new(capacity),
        })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Entries evicted by capacity pressure so far.
    pub fn evictions(&self) -> u64 {
        self.store.evictions()
    }
}

impl<K, V> CacheStore<K, V> for BoundedCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    #[inline]
    fn get(&self, key: &K) -> Option<V> {
        self.store.get(key)
    }

    #[inline]
    fn set(&self, key: K, value: V) {
        self.store.insert(key, value);
    }

    fn label(&self) -> &'static str {
        "Bounded LRU"
    }
}
