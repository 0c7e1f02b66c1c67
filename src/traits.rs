//! # Cache Contract
//!
//! Every synchronization strategy in [`crate::strategy`] stores the same
//! key-value mapping and exposes the same two operations. The benchmark driver
//! only ever talks to this contract, so a workload runs unchanged against any
//! strategy.
//!
//! ## Architecture
//!
//! ```text
//!            ┌─────────────────────────────────────┐
//!            │        CacheStore<K, V>             │   blocking callers
//!            │                                     │   (thread pool, UI)
//!            │  get(&self, &K) → Option<V>         │
//!            │  set(&self, K, V)                   │
//!            │  label(&self) → &'static str        │
//!            └──────────────────┬──────────────────┘
//!                               │ implemented by all strategies
//!     ┌──────────┬──────────┬───┴──────┬───────────┬──────────┬──────────┐
//!     ▼          ▼          ▼          ▼           ▼          ▼          ▼
//!   Mutex     Unfair     Serial    Barrier      RwLock     Actor     Bounded
//!                        Queue      Queue                    │
//!                                                            │ natively
//!            ┌───────────────────────────────────────────────▼──┐
//!            │        AsyncCacheStore<K, V>                     │   awaiting callers
//!            │                                                  │   (task group)
//!            │  async get(&self, &K) → Option<V>                │
//!            │  async set(&self, K, V)                          │
//!            └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Semantics
//!
//! | Operation | Absent key      | Present key         | Failure |
//! |-----------|-----------------|---------------------|---------|
//! | `get`     | `None`          | `Some(clone)`       | never   |
//! | `set`     | inserts         | overwrites          | never   |
//!
//! Both operations take `&self`: one instance is shared between execution
//! units behind an `Arc`, and the strategy decides how concurrent calls are
//! ordered. A `get` never blocks indefinitely on a healthy strategy.
//!
//! ## Thread Safety
//!
//! Both traits require `Send + Sync`. How much ordering a strategy provides
//! beyond "no lost single-key updates" is documented on each strategy type.

use async_trait::async_trait;

/// Blocking key-value cache contract.
///
/// # Example
///
/// ```
/// use syncbench::strategy::rwlock::RwLockCache;
/// use syncbench::traits::CacheStore;
///
/// fn warm<C: CacheStore<u64, String>>(cache: &C, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         cache.set(*key, value.to_string());
///     }
/// }
///
/// let cache = RwLockCache::new();
/// warm(&cache, &[(1, "one"), (2, "two")]);
/// assert_eq!(cache.get(&2), Some("two".to_string()));
/// assert_eq!(cache.get(&3), None);
/// ```
pub trait CacheStore<K, V>: Send + Sync {
    /// Returns the current value for `key`, or `None` if it is absent.
    fn get(&self, key: &K) -> Option<V>;

    /// Installs `value` for `key`, replacing any previous value.
    fn set(&self, key: K, value: V);

    /// Name used in benchmark reports.
    fn label(&self) -> &'static str;
}

/// Awaiting form of [`CacheStore`].
///
/// Callers suspend instead of blocking a thread while the strategy serves
/// the request. Strategies that never suspend resolve immediately.
#[async_trait]
pub trait AsyncCacheStore<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Returns the current value for `key`, or `None` if it is absent.
    async fn get(&self, key: &K) -> Option<V>;

    /// Installs `value` for `key`, replacing any previous value.
    async fn set(&self, key: K, value: V);
}
