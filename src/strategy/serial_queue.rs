//! Serial task-queue strategy.
//!
//! A dedicated worker thread owns the table outright. Callers never touch it;
//! they push a boxed job onto a FIFO channel and block on a one-slot reply
//! channel until the worker has run it. Both `get` and `set` are awaited, so
//! every operation is totally ordered by its position in the queue.
//!
//! ```text
//!   caller A ──job──┐                       ┌──reply──► caller A
//!   caller B ──job──┼──► [ FIFO channel ] ──► worker (owns FxHashMap)
//!   caller C ──job──┘                       └──reply──► caller C
//! ```
//!
//! Throughput is bounded by the dispatch round trip rather than by lock
//! contention. Dropping the cache closes the channel; the worker drains what
//! is already queued and exits, and the drop joins it.

use std::hash::Hash;
use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::traits::CacheStore;

type Job<K, V> = Box<dyn FnOnce(&mut FxHashMap<K, V>) + Send>;

/// Cache served by a single FIFO worker thread.
pub struct SerialQueueCache<K, V> {
    jobs: Option<Sender<Job<K, V>>>,
    worker: Option<JoinHandle<()>>,
}

impl<K, V> SerialQueueCache<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn() -> io::Result<Self> {
        let (jobs, inbox) = crossbeam_channel::unbounded::<Job<K, V>>();
        let worker = thread::Builder::new()
            .name("syncbench-serial".to_string())
            .spawn(move || {
                let mut table = FxHashMap::default();
                for job in inbox.iter() {
                    job(&mut table);
                }
                debug!(entries = table.len(), "serial queue worker drained");
            })?;

        Ok(Self {
            jobs: Some(jobs),
            worker: Some(worker),
        })
    }

    /// Runs `job` on the worker and waits for its result.
    ///
    /// Returns `None` only if the worker is gone, which cannot happen while
    /// `self` is alive unless a job panicked.
    fn submit<R>(&self, job: impl FnOnce(&mut FxHashMap<K, V>) -> R + Send + 'static) -> Option<R>
    where
        R: Send + 'static,
    {
        let jobs = self.jobs.as_ref()?;
        let (reply, response) = crossbeam_channel::bounded(1);
        let job: Job<K, V> = Box::new(move |table| {
            let _ = reply.send(job(table));
        });
        jobs.send(job).ok()?;
        response.recv().ok()
    }

    /// Number of stored entries, read through the queue.
    pub fn len(&self) -> usize {
        self.submit(|table| table.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> CacheStore<K, V> for SerialQueueCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let key = key.clone();
        self.submit(move |table| table.get(&key).cloned()).flatten()
    }

    fn set(&self, key: K, value: V) {
        self.submit(move |table| {
            table.insert(key, value);
        });
    }

    fn label(&self) -> &'static str {
        "Serial Queue"
    }
}

impl<K, V> Drop for SerialQueueCache<K, V> {
    fn drop(&mut self) {
        // Closing the channel ends the worker's receive loop.
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
