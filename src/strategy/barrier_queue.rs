//! Concurrent task-queue strategy with write barriers.
//!
//! A pool of worker threads drains one FIFO task queue. Tasks come in two
//! kinds:
//!
//! - **Read**: may start whenever no barrier is running, alongside any number
//!   of other reads.
//! - **Barrier**: may start only once every running read has finished and no
//!   other barrier runs; while it runs nothing else starts.
//!
//! Tasks start strictly in queue order. A barrier at the head therefore holds
//! back the reads queued behind it, and those reads observe its write.
//!
//! ```text
//!   queue:  R R R [B] R R [B] R
//!           ╰─┬─╯  │  ╰┬╯  │
//!     concurrent   │ concurrent│
//!                  ▼           ▼
//!           drains reads, runs alone
//! ```
//!
//! `set` enqueues a barrier and returns immediately; `get` enqueues a read and
//! waits for the reply. Because both go through the same FIFO, a `get` issued
//! after a `set` by the same caller always sees that write, and writes are
//! totally ordered among themselves. Concurrent reads are unordered relative
//! to each other.
//!
//! Dropping the cache lets the workers finish every queued task, then joins
//! them.

use std::cell::UnsafeCell;
use std::collections::VecDeque;
use std::hash::Hash;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::traits::CacheStore;

type ReadJob<K, V> = Box<dyn FnOnce(&FxHashMap<K, V>) + Send>;
type BarrierJob<K, V> = Box<dyn FnOnce(&mut FxHashMap<K, V>) + Send>;

enum Task<K, V> {
    Read(ReadJob<K, V>),
    Barrier(BarrierJob<K, V>),
}

struct Schedule<K, V> {
    tasks: VecDeque<Task<K, V>>,
    running_reads: usize,
    barrier_running: bool,
    shutdown: bool,
}

impl<K, V> Schedule<K, V> {
    /// Whether the task at the head of the queue may start now.
    fn head_runnable(&self) -> bool {
        match self.tasks.front() {
            Some(Task::Read(_)) => !self.barrier_running,
            Some(Task::Barrier(_)) => !self.barrier_running && self.running_reads == 0,
            None => false,
        }
    }
}

struct Shared<K, V> {
    schedule: Mutex<Schedule<K, V>>,
    wake: Condvar,
    table: UnsafeCell<FxHashMap<K, V>>,
}

// SAFETY: `table` is only reached from `run_worker`. Read tasks get `&` while
// `running_reads > 0` and no barrier runs; a barrier gets `&mut` only while
// `running_reads == 0` and it is the sole barrier. Both conditions are checked
// and updated under `schedule`, whose lock/unlock orders every table access
// after the previous conflicting one.
unsafe impl<K: Send + Sync, V: Send + Sync> Sync for Shared<K, V> {}

/// Cache served by a worker pool with reads in parallel and writes as barriers.
pub struct BarrierQueueCache<K, V> {
    shared: Arc<Shared<K, V>>,
    workers: Vec<JoinHandle<()>>,
}

impl<K, V> BarrierQueueCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Starts one worker per CPU.
    pub fn spawn() -> io::Result<Self> {
        Self::with_workers(num_cpus::get())
    }

    /// Starts `workers` worker threads (at least one).
    ///
    /// # Errors
    ///
    /// Returns the OS error if a thread cannot be spawned. Threads started
    /// before the failure are shut down and joined.
    pub fn with_workers(workers: usize) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            schedule: Mutex::new(Schedule {
                tasks: VecDeque::new(),
                running_reads: 0,
                barrier_running: false,
                shutdown: false,
            }),
            wake: Condvar::new(),
            table: UnsafeCell::new(FxHashMap::default()),
        });

        let mut cache = Self {
            shared,
            workers: Vec::with_capacity(workers.max(1)),
        };
        for index in 0..workers.max(1) {
            let shared = Arc::clone(&cache.shared);
            let handle = thread::Builder::new()
                .name(format!("syncbench-barrier-{index}"))
                .spawn(move || run_worker(&shared))?;
            cache.workers.push(handle);
        }

        debug!(workers = cache.workers.len(), "barrier queue started");
        Ok(cache)
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Blocks until every task queued before this call has finished.
    ///
    /// Implemented as a barrier that replies, so it also waits for pending
    /// fire-and-forget writes.
    pub fn quiesce(&self) {
        let (done, finished) = crossbeam_channel::bounded(1);
        self.enqueue(Task::Barrier(Box::new(move |_| {
            let _ = done.send(());
        })));
        let _ = finished.recv();
    }

    fn enqueue(&self, task: Task<K, V>) {
        let mut schedule = self.shared.schedule.lock();
        let was_empty = schedule.tasks.is_empty();
        schedule.tasks.push_back(task);
        if was_empty {
            self.shared.wake.notify_one();
        }
    }
}

fn run_worker<K, V>(shared: &Shared<K, V>) {
    let mut schedule = shared.schedule.lock();
    loop {
        if !schedule.head_runnable() {
            if schedule.shutdown && schedule.tasks.is_empty() {
                break;
            }
            shared.wake.wait(&mut schedule);
            continue;
        }

        match schedule.tasks.pop_front() {
            Some(Task::Read(job)) => {
                schedule.running_reads += 1;
                if schedule.head_runnable() {
                    shared.wake.notify_one();
                }
                MutexGuard::unlocked(&mut schedule, || {
                    // SAFETY: a read was admitted under the schedule lock with
                    // no barrier running; none can start until this read
                    // decrements `running_reads`.
                    let table = unsafe { &*shared.table.get() };
                    job(table);
                });
                schedule.running_reads -= 1;
                if schedule.running_reads == 0 {
                    shared.wake.notify_all();
                }
            },
            Some(Task::Barrier(job)) => {
                schedule.barrier_running = true;
                MutexGuard::unlocked(&mut schedule, || {
                    // SAFETY: admitted with no reads and no barrier running;
                    // `barrier_running` keeps every other task out until reset.
                    let table = unsafe { &mut *shared.table.get() };
                    job(table);
                });
                schedule.barrier_running = false;
                shared.wake.notify_all();
            },
            None => {},
        }
    }
}

impl<K, V> CacheStore<K, V> for BarrierQueueCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let key = key.clone();
        let (reply, response) = crossbeam_channel::bounded(1);
        self.enqueue(Task::Read(Box::new(move |table| {
            let _ = reply.send(table.get(&key).cloned());
        })));
        response.recv().ok().flatten()
    }

    fn set(&self, key: K, value: V) {
        self.enqueue(Task::Barrier(Box::new(move |table| {
            table.insert(key, value);
        })));
    }

    fn label(&self) -> &'static str {
        "Concurrent Queue"
    }
}

impl<K, V> Drop for BarrierQueueCache<K, V> {
    fn drop(&mut self) {
        self.shared.schedule.lock().shutdown = true;
        self.shared.wake.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[test]
    fn read_after_set_observes_write() {
        let cache = BarrierQueueCache::with_workers(4).unwrap();
        for i in 0..1_000u64 {
            cache.set(i % 7, i);
            assert_eq!(cache.get(&(i % 7)), Some(i));
        }
    }

    #[test]
    fn quiesce_waits_for_pending_barriers() {
        let cache = BarrierQueueCache::with_workers(2).unwrap();
        for i in 0..500u64 {
            cache.set(i, i);
        }
        cache.quiesce();

        let schedule = cache.shared.schedule.lock();
        assert!(schedule.tasks.is_empty());
        assert_eq!(schedule.running_reads, 0);
    }

    #[test]
    fn reads_run_concurrently() {
        let cache = Arc::new(BarrierQueueCache::<u64, u64>::with_workers(4).unwrap());
        let peak = Arc::new(AtomicUsize::new(0));
        let current = Arc::new(AtomicUsize::new(0));
        let (done, finished) = crossbeam_channel::unbounded();

        for _ in 0..4 {
            let peak = Arc::clone(&peak);
            let current = Arc::clone(&current);
            let done = done.clone();
            cache.enqueue(Task::Read(Box::new(move |_| {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(50));
                current.fetch_sub(1, Ordering::SeqCst);
                let _ = done.send(());
            })));
        }
        for _ in 0..4 {
            finished.recv().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn barrier_excludes_reads() {
        let cache = Arc::new(BarrierQueueCache::<u64, u64>::with_workers(4).unwrap());
        let readers = Arc::new(AtomicUsize::new(0));
        let writers = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));

        for round in 0..50 {
            let readers = Arc::clone(&readers);
            let writers = Arc::clone(&writers);
            let overlaps = Arc::clone(&overlaps);
            if round % 5 == 0 {
                cache.enqueue(Task::Barrier(Box::new(move |_| {
                    writers.fetch_add(1, Ordering::SeqCst);
                    if readers.load(Ordering::SeqCst) != 0 {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    thread::sleep(Duration::from_millis(1));
                    writers.fetch_sub(1, Ordering::SeqCst);
                })));
            } else {
                cache.enqueue(Task::Read(Box::new(move |_| {
                    readers.fetch_add(1, Ordering::SeqCst);
                    if writers.load(Ordering::SeqCst) != 0 {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    thread::sleep(Duration::from_millis(1));
                    readers.fetch_sub(1, Ordering::SeqCst);
                })));
            }
        }
        cache.quiesce();

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }
}
