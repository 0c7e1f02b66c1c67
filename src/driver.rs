//! Benchmark driver: runs one workload against one cache instance.
//!
//! ## Execution models
//!
//! ```text
//!   Execution::ThreadPool                     Execution::TaskGroup
//!   ─────────────────────                     ────────────────────
//!   caller                                    caller
//!     │ pool.spawn(job)                         │ runtime.block_on
//!     │                                         │
//!     │   rayon pool (workers threads)          │   tokio runtime (workers threads)
//!     │   (0..n).into_par_iter()                │   JoinSet: one task per iteration
//!     │     └─ CacheStore::get / set            │     └─ AsyncCacheStore::get / set
//!     │                                         │
//!     └─ done.recv_timeout(timeout)             └─ time::timeout(timeout, join all)
//! ```
//!
//! Blocking strategies fan out across a rayon pool. The actor fans out as
//! concurrently awaited tasks, so callers suspend without pinning a thread
//! while the single owner works through its mailbox.
//!
//! Pre-population runs before the clock starts but under the same watchdog as
//! the measured work. A run that exceeds the configured timeout is reported as
//! [`BenchError::Stalled`]; it is never retried, and any work still in flight
//! is abandoned.
//!
//! Alongside the elapsed time the driver counts reads, writes, read misses and
//! reads that returned a value the workload never wrote. The counters are
//! relaxed atomics; they are only read after every iteration has finished.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tokio::runtime::Runtime;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::builder::{Cache, CacheBuilder, Execution, Strategy};
use crate::config::HarnessConfig;
use crate::error::BenchError;
use crate::report::TimingResult;
use crate::traits::{AsyncCacheStore, CacheStore};
use crate::workload::{OpKind, WorkloadSpec};

/// Everything measured during one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub strategy: Strategy,
    pub elapsed: Duration,
    pub reads: u64,
    pub writes: u64,
    /// Reads that returned `None`.
    pub misses: u64,
    /// Reads that returned a value no write could have produced for that key.
    pub inconsistent_reads: u64,
}

impl RunOutcome {
    pub fn label(&self) -> &'static str {
        self.strategy.label()
    }

    pub fn timing(&self) -> TimingResult {
        TimingResult::new(self.label(), self.elapsed)
    }
}

#[derive(Default)]
struct Tally {
    reads: AtomicU64,
    writes: AtomicU64,
    misses: AtomicU64,
    inconsistent: AtomicU64,
}

impl Tally {
    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    fn observe(&self, spec: &WorkloadSpec, key: u64, read: Option<u64>) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        match read {
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            },
            Some(value) if !spec.could_have_written(key, value) => {
                self.inconsistent.fetch_add(1, Ordering::Relaxed);
            },
            Some(_) => {},
        }
    }

    fn finish(&self, strategy: Strategy, elapsed: Duration) -> RunOutcome {
        RunOutcome {
            strategy,
            elapsed,
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inconsistent_reads: self.inconsistent.load(Ordering::Relaxed),
        }
    }
}

fn apply_blocking(cache: &Cache<u64, u64>, spec: &WorkloadSpec, tally: &Tally, i: u64) {
    let op = spec.operation(i);
    match op.kind {
        OpKind::Read => tally.observe(spec, op.key, CacheStore::get(cache, &op.key)),
        OpKind::Write => {
            CacheStore::set(cache, op.key, op.value);
            tally.wrote();
        },
        OpKind::WriteThenRead => {
            CacheStore::set(cache, op.key, op.value);
            tally.wrote();
            tally.observe(spec, op.key, CacheStore::get(cache, &op.key));
        },
    }
}

async fn apply_async(cache: &Cache<u64, u64>, spec: &WorkloadSpec, tally: &Tally, i: u64) {
    let op = spec.operation(i);
    match op.kind {
        OpKind::Read => {
            let read = AsyncCacheStore::get(cache, &op.key).await;
            tally.observe(spec, op.key, read);
        },
        OpKind::Write => {
            AsyncCacheStore::set(cache, op.key, op.value).await;
            tally.wrote();
        },
        OpKind::WriteThenRead => {
            AsyncCacheStore::set(cache, op.key, op.value).await;
            tally.wrote();
            let read = AsyncCacheStore::get(cache, &op.key).await;
            tally.observe(spec, op.key, read);
        },
    }
}

/// Owns the execution resources shared by every run: a rayon pool for
/// blocking strategies and a tokio runtime for the actor.
pub struct Driver {
    config: HarnessConfig,
    pool: ThreadPool,
    runtime: Runtime,
}

impl Driver {
    /// # Errors
    ///
    /// Fails if `config` is invalid or if the pool or runtime cannot start.
    pub fn new(config: HarnessConfig) -> Result<Self, BenchError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("syncbench-pool-{i}"))
            .build()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.workers)
            .thread_name("syncbench-rt")
            .enable_time()
            .build()?;
        debug!(workers = config.workers, "driver started");
        Ok(Self {
            config,
            pool,
            runtime,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// A builder whose actor instances live on this driver's runtime.
    pub fn cache_builder(&self) -> CacheBuilder {
        CacheBuilder::from_config(&self.config).runtime(self.runtime.handle().clone())
    }

    /// Builds a fresh instance of `strategy` and runs `spec` against it.
    pub fn run_strategy(
        &self,
        strategy: Strategy,
        spec: &WorkloadSpec,
    ) -> Result<RunOutcome, BenchError> {
        let cache = self.cache_builder().build::<u64, u64>(strategy)?;
        self.run(Arc::new(cache), spec)
    }

    /// Runs `spec` against `cache`, timing only the measured phase.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Stalled`] if the run outlives the configured
    /// timeout.
    ///
    /// # Panics
    ///
    /// A panic raised by the cache inside a worker is resumed on the caller.
    pub fn run(
        &self,
        cache: Arc<Cache<u64, u64>>,
        spec: &WorkloadSpec,
    ) -> Result<RunOutcome, BenchError> {
        let strategy = cache.strategy();
        debug!(
            strategy = strategy.id(),
            iterations = spec.iterations(),
            key_space = spec.key_space(),
            prepopulate = spec.prepopulate(),
            "run starting"
        );

        let outcome = match strategy.execution() {
            Execution::ThreadPool => self.run_on_pool(cache, *spec),
            Execution::TaskGroup => self.run_on_runtime(cache, *spec),
        };

        match &outcome {
            Ok(outcome) => debug!(
                strategy = strategy.id(),
                elapsed_ms = outcome.elapsed.as_secs_f64() * 1e3,
                reads = outcome.reads,
                writes = outcome.writes,
                misses = outcome.misses,
                inconsistent = outcome.inconsistent_reads,
                "run finished"
            ),
            Err(err) => error!(strategy = strategy.id(), %err, "run failed"),
        }
        outcome
    }

    fn run_on_pool(
        &self,
        cache: Arc<Cache<u64, u64>>,
        spec: WorkloadSpec,
    ) -> Result<RunOutcome, BenchError> {
        let strategy = cache.strategy();
        let tally = Arc::new(Tally::default());
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        {
            let tally = Arc::clone(&tally);
            self.pool.spawn(move || {
                let measured = panic::catch_unwind(AssertUnwindSafe(|| {
                    for key in 0..spec.prepopulate() {
                        CacheStore::set(&*cache, key, key);
                    }
                    let start = Instant::now();
                    (0..spec.iterations())
                        .into_par_iter()
                        .for_each(|i| apply_blocking(&cache, &spec, &tally, i));
                    start.elapsed()
                }));
                let _ = done_tx.send(measured);
            });
        }

        match done_rx.recv_timeout(self.config.timeout) {
            Ok(Ok(elapsed)) => Ok(tally.finish(strategy, elapsed)),
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => Err(BenchError::Stalled {
                label: strategy.label().to_string(),
                timeout: self.config.timeout,
            }),
        }
    }

    fn run_on_runtime(
        &self,
        cache: Arc<Cache<u64, u64>>,
        spec: WorkloadSpec,
    ) -> Result<RunOutcome, BenchError> {
        let strategy = cache.strategy();
        let timeout = self.config.timeout;
        let tally = Arc::new(Tally::default());

        let measured = self.runtime.block_on({
            let tally = Arc::clone(&tally);
            let run = async move {
                for key in 0..spec.prepopulate() {
                    AsyncCacheStore::set(&*cache, key, key).await;
                }

                let start = Instant::now();
                let mut tasks = JoinSet::new();
                for i in 0..spec.iterations() {
                    let cache = Arc::clone(&cache);
                    let tally = Arc::clone(&tally);
                    tasks.spawn(async move { apply_async(&cache, &spec, &tally, i).await });
                }
                while let Some(joined) = tasks.join_next().await {
                    if let Err(err) = joined {
                        if err.is_panic() {
                            panic::resume_unwind(err.into_panic());
                        }
                    }
                }
                start.elapsed()
            };
            // Built inside `block_on`: the timer needs the runtime context.
            async move { tokio::time::timeout(timeout, run).await }
        });

        match measured {
            Ok(elapsed) => Ok(tally.finish(strategy, elapsed)),
            Err(_) => Err(BenchError::Stalled {
                label: strategy.label().to_string(),
                timeout,
            }),
        }
    }
}
