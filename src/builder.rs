//! Unified cache builder for all synchronization strategies.
//!
//! Every strategy is selected at construction time and wrapped in [`Cache`],
//! an enum-of-implementations that itself implements both
//! [`CacheStore`] and [`AsyncCacheStore`]. Callers, including the benchmark
//! driver, never branch on the strategy to use it.
//!
//! ## Example
//!
//! ```rust
//! use syncbench::builder::{CacheBuilder, Strategy};
//! use syncbench::traits::CacheStore;
//!
//! let cache = CacheBuilder::new().build::<u64, String>(Strategy::RwLock).unwrap();
//! cache.set(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;

use async_trait::async_trait;
use serde::Serialize;
use tokio::runtime::Handle;

use crate::config::HarnessConfig;
use crate::error::{BenchError, ConfigError};
use crate::strategy::actor::{ActorCache, DEFAULT_MAILBOX_CAPACITY};
use crate::strategy::barrier_queue::BarrierQueueCache;
use crate::strategy::bounded::{BoundedCache, DEFAULT_CAPACITY};
use crate::strategy::mutex::MutexCache;
use crate::strategy::rwlock::RwLockCache;
use crate::strategy::serial_queue::SerialQueueCache;
use crate::strategy::unfair::UnfairLockCache;
use crate::traits::{AsyncCacheStore, CacheStore};

/// Available synchronization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One OS mutex around the table.
    Mutex,
    /// One unfair spin-then-park lock around the table.
    UnfairLock,
    /// A single FIFO worker thread owns the table.
    SerialQueue,
    /// A worker pool runs reads concurrently and writes as barriers.
    BarrierQueue,
    /// Shared lock for reads, exclusive lock for writes.
    RwLock,
    /// A single async task owns the table; requests are messages.
    Actor,
    /// Capacity-bounded LRU behind a mutex.
    Bounded,
}

/// How the driver fans a workload out over a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// Blocking calls from a pool of OS threads.
    ThreadPool,
    /// Awaited calls from many tasks on an async runtime.
    TaskGroup,
}

impl Strategy {
    /// Every strategy, in report registration order.
    pub const ALL: [Strategy; 7] = [
        Strategy::Mutex,
        Strategy::UnfairLock,
        Strategy::SerialQueue,
        Strategy::BarrierQueue,
        Strategy::RwLock,
        Strategy::Actor,
        Strategy::Bounded,
    ];

    /// Short identifier (e.g. `"serial_queue"`).
    pub fn id(self) -> &'static str {
        match self {
            Strategy::Mutex => "mutex",
            Strategy::UnfairLock => "unfair_lock",
            Strategy::SerialQueue => "serial_queue",
            Strategy::BarrierQueue => "barrier_queue",
            Strategy::RwLock => "rw_lock",
            Strategy::Actor => "actor",
            Strategy::Bounded => "bounded",
        }
    }

    /// Report name (e.g. `"Serial Queue"`).
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Mutex => "Mutex",
            Strategy::UnfairLock => "Unfair Lock",
            Strategy::SerialQueue => "Serial Queue",
            Strategy::BarrierQueue => "Concurrent Queue",
            Strategy::RwLock => "RW Lock",
            Strategy::Actor => "Actor",
            Strategy::Bounded => "Bounded LRU",
        }
    }

    pub fn execution(self) -> Execution {
        match self {
            Strategy::Actor => Execution::TaskGroup,
            _ => Execution::ThreadPool,
        }
    }

    /// Whether all operations on one instance fall into a single sequence.
    pub fn is_totally_ordered(self) -> bool {
        matches!(
            self,
            Strategy::Mutex
                | Strategy::UnfairLock
                | Strategy::SerialQueue
                | Strategy::Actor
                | Strategy::Bounded
        )
    }

    /// Whether a previously set key can read as absent without being removed.
    pub fn may_evict(self) -> bool {
        matches!(self, Strategy::Bounded)
    }

    /// Looks a strategy up by [`Strategy::id`].
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cache wrapper that provides one API regardless of strategy.
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V> {
    Mutex(MutexCache<K, V>),
    UnfairLock(UnfairLockCache<K, V>),
    SerialQueue(SerialQueueCache<K, V>),
    BarrierQueue(BarrierQueueCache<K, V>),
    RwLock(RwLockCache<K, V>),
    Actor(ActorCache<K, V>),
    Bounded(BoundedCache<K, V>),
}

impl<K, V> Cache<K, V> {
    pub fn strategy(&self) -> Strategy {
        match &self.inner {
            CacheInner::Mutex(_) => Strategy::Mutex,
            CacheInner::UnfairLock(_) => Strategy::UnfairLock,
            CacheInner::SerialQueue(_) => Strategy::SerialQueue,
            CacheInner::BarrierQueue(_) => Strategy::BarrierQueue,
            CacheInner::RwLock(_) => Strategy::RwLock,
            CacheInner::Actor(_) => Strategy::Actor,
            CacheInner::Bounded(_) => Strategy::Bounded,
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Blocks until every write this cache has accepted is applied.
    ///
    /// Only the barrier queue acknowledges `set` before applying it; for every
    /// other strategy this returns immediately.
    pub fn quiesce(&self) {
        if let CacheInner::BarrierQueue(cache) = &self.inner {
            cache.quiesce();
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("strategy", &self.strategy())
            .finish_non_exhaustive()
    }
}

impl<K, V> CacheStore<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        match &self.inner {
            CacheInner::Mutex(cache) => cache.get(key),
            CacheInner::UnfairLock(cache) => cache.get(key),
            CacheInner::SerialQueue(cache) => cache.get(key),
            CacheInner::BarrierQueue(cache) => cache.get(key),
            CacheInner::RwLock(cache) => cache.get(key),
            CacheInner::Actor(cache) => CacheStore::get(cache, key),
            CacheInner::Bounded(cache) => cache.get(key),
        }
    }

    fn set(&self, key: K, value: V) {
        match &self.inner {
            CacheInner::Mutex(cache) => cache.set(key, value),
            CacheInner::UnfairLock(cache) => cache.set(key, value),
            CacheInner::SerialQueue(cache) => cache.set(key, value),
            CacheInner::BarrierQueue(cache) => cache.set(key, value),
            CacheInner::RwLock(cache) => cache.set(key, value),
            CacheInner::Actor(cache) => CacheStore::set(cache, key, value),
            CacheInner::Bounded(cache) => cache.set(key, value),
        }
    }

    fn label(&self) -> &'static str {
        self.strategy().label()
    }
}

// Strategies other than the actor never suspend; their blocking call runs
// inline on the awaiting task.
#[async_trait]
impl<K, V> AsyncCacheStore<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        match &self.inner {
            CacheInner::Actor(cache) => AsyncCacheStore::get(cache, key).await,
            _ => CacheStore::get(self, key),
        }
    }

    async fn set(&self, key: K, value: V) {
        match &self.inner {
            CacheInner::Actor(cache) => AsyncCacheStore::set(cache, key, value).await,
            _ => CacheStore::set(self, key, value),
        }
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    bounded_capacity: usize,
    mailbox_capacity: usize,
    queue_workers: usize,
    runtime: Option<Handle>,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self {
            bounded_capacity: DEFAULT_CAPACITY,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            queue_workers: num_cpus::get(),
            runtime: None,
        }
    }

    /// Builder sized from a harness configuration.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            bounded_capacity: config.bounded_capacity,
            mailbox_capacity: config.mailbox_capacity,
            queue_workers: config.workers,
            runtime: None,
        }
    }

    pub fn bounded_capacity(mut self, capacity: usize) -> Self {
        self.bounded_capacity = capacity;
        self
    }

    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    pub fn queue_workers(mut self, workers: usize) -> Self {
        self.queue_workers = workers;
        self
    }

    /// Runtime that hosts actor owner tasks.
    ///
    /// Without one, [`CacheBuilder::build`] uses the ambient runtime and
    /// fails for [`Strategy::Actor`] if there is none.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build a fresh cache with the specified strategy.
    ///
    /// # Errors
    ///
    /// - [`BenchError::Config`] for a zero bounded capacity, or for the actor
    ///   strategy with no runtime available.
    /// - [`BenchError::Spawn`] if a queue strategy cannot start its threads.
    pub fn build<K, V>(&self, strategy: Strategy) -> Result<Cache<K, V>, BenchError>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let inner = match strategy {
            Strategy::Mutex => CacheInner::Mutex(MutexCache::new()),
            Strategy::UnfairLock => CacheInner::UnfairLock(UnfairLockCache::new()),
            Strategy::SerialQueue => CacheInner::SerialQueue(SerialQueueCache::spawn()?),
            Strategy::BarrierQueue => {
                CacheInner::BarrierQueue(BarrierQueueCache::with_workers(self.queue_workers)?)
            },
            Strategy::RwLock => CacheInner::RwLock(RwLockCache::new()),
            Strategy::Actor => {
                let handle = match &self.runtime {
                    Some(handle) => handle.clone(),
                    None => Handle::try_current().map_err(|_| {
                        ConfigError::new("actor strategy requires a tokio runtime handle")
                    })?,
                };
                CacheInner::Actor(ActorCache::spawn_on(&handle, self.mailbox_capacity))
            },
            Strategy::Bounded => CacheInner::Bounded(BoundedCache::try_new(self.bounded_capacity)?),
        };

        Ok(Cache { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .build()
            .unwrap()
    }

    #[test]
    fn test_all_strategies_basic_ops() {
        let rt = runtime();
        let builder = CacheBuilder::new().queue_workers(2).runtime(rt.handle().clone());

        for strategy in Strategy::ALL {
            let cache = builder.build::<u64, String>(strategy).unwrap();
            assert_eq!(cache.strategy(), strategy);
            assert_eq!(cache.label(), strategy.label());

            assert_eq!(CacheStore::get(&cache, &1), None);
            CacheStore::set(&cache, 1, "one".to_string());
            CacheStore::set(&cache, 2, "two".to_string());
            assert_eq!(CacheStore::get(&cache, &1), Some("one".to_string()));
            assert_eq!(CacheStore::get(&cache, &2), Some("two".to_string()));

            CacheStore::set(&cache, 1, "ONE".to_string());
            assert_eq!(
                CacheStore::get(&cache, &1),
                Some("ONE".to_string()),
                "{strategy}"
            );
        }
    }

    #[test]
    fn quiesce_leaves_every_write_applied() {
        let rt = runtime();
        let builder = CacheBuilder::new().queue_workers(4).runtime(rt.handle().clone());

        for strategy in Strategy::ALL {
            let cache = builder.build::<u64, u64>(strategy).unwrap();
            for i in 0..500 {
                CacheStore::set(&cache, i % 10, i);
            }
            cache.quiesce();
            for key in 0..10 {
                assert_eq!(CacheStore::get(&cache, &key), Some(490 + key), "{strategy}");
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn awaited_calls_reach_every_strategy() {
        let builder = CacheBuilder::new().queue_workers(2);
        for strategy in Strategy::ALL {
            let cache = builder.build::<u64, u64>(strategy).unwrap();
            AsyncCacheStore::set(&cache, 7, 70).await;
            assert_eq!(AsyncCacheStore::get(&cache, &7).await, Some(70), "{strategy}");
        }
    }

    #[test]
    fn actor_without_runtime_is_a_config_error() {
        let err = CacheBuilder::new()
            .build::<u64, u64>(Strategy::Actor)
            .unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn zero_bounded_capacity_is_rejected() {
        let err = CacheBuilder::new()
            .bounded_capacity(0)
            .build::<u64, u64>(Strategy::Bounded)
            .unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn ids_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(Strategy::from_id(strategy.id()), Some(strategy));
        }
        assert_eq!(Strategy::from_id("nope"), None);
    }

    #[test]
    fn ordering_classes() {
        let partial: Vec<_> = Strategy::ALL
            .into_iter()
            .filter(|s| !s.is_totally_ordered())
            .collect();
        assert_eq!(partial, [Strategy::BarrierQueue, Strategy::RwLock]);
        assert!(Strategy::Bounded.may_evict());
        assert!(!Strategy::Mutex.may_evict());
    }

    #[test]
    fn only_actor_uses_task_group() {
        for strategy in Strategy::ALL {
            let expected = if strategy == Strategy::Actor {
                Execution::TaskGroup
            } else {
                Execution::ThreadPool
            };
            assert_eq!(strategy.execution(), expected);
        }
    }
}
