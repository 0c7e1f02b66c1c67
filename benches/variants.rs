//! Single-caller operation latency for every synchronization strategy.
//!
//! Run with: `cargo bench --bench variants`
//!
//! Measures the uncontended cost of `get` and `set` through the blocking
//! contract. Contended throughput is what the `syncbench` binary reports.

use std::hint::black_box;
use std::time::Instant;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use syncbench::builder::{Cache, CacheBuilder, Strategy};
use syncbench::traits::CacheStore;
use tokio::runtime::Runtime;

const KEYS: u64 = 1_000;
const OPS: u64 = 10_000;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .expect("failed to start runtime")
}

fn warm_cache(rt: &Runtime, strategy: Strategy) -> Cache<u64, u64> {
    let cache = CacheBuilder::new()
        .runtime(rt.handle().clone())
        .build(strategy)
        .expect("failed to build cache");
    for key in 0..KEYS {
        CacheStore::set(&cache, key, key);
    }
    cache
}

// ============================================================================
// Get Hit Latency
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("get_hit");
    group.throughput(Throughput::Elements(OPS));

    for strategy in Strategy::ALL {
        group.bench_function(BenchmarkId::from_parameter(strategy.id()), |b| {
            let cache = warm_cache(&rt, strategy);
            b.iter_custom(|iters| {
                let start = Instant::now();
                for _ in 0..iters {
                    for i in 0..OPS {
                        black_box(CacheStore::get(&cache, &(i % KEYS)));
                    }
                }
                start.elapsed()
            })
        });
    }
    group.finish();
}

// ============================================================================
// Set Latency
// ============================================================================

fn bench_set(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(OPS));

    for strategy in Strategy::ALL {
        group.bench_function(BenchmarkId::from_parameter(strategy.id()), |b| {
            let cache = warm_cache(&rt, strategy);
            b.iter_custom(|iters| {
                let start = Instant::now();
                for _ in 0..iters {
                    for i in 0..OPS {
                        CacheStore::set(&cache, i % KEYS, i);
                    }
                }
                // Barrier-queue writes are acknowledged before they apply.
                cache.quiesce();
                start.elapsed()
            })
        });
    }
    group.finish();
}

// ============================================================================
// Random 75/25 Read/Write Mix
// ============================================================================

fn bench_random_mix(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("random_mix");
    group.throughput(Throughput::Elements(OPS));

    for strategy in Strategy::ALL {
        group.bench_function(BenchmarkId::from_parameter(strategy.id()), |b| {
            let cache = warm_cache(&rt, strategy);
            let mut rng = SmallRng::seed_from_u64(42);
            b.iter_custom(|iters| {
                let start = Instant::now();
                for _ in 0..iters {
                    for _ in 0..OPS {
                        let key = rng.random_range(0..KEYS);
                        if rng.random::<f64>() < 0.25 {
                            CacheStore::set(&cache, key, key);
                        } else {
                            black_box(CacheStore::get(&cache, &key));
                        }
                    }
                }
                start.elapsed()
            })
        });
    }
    group.finish();
}

criterion_group!(micro_ops, bench_get_hit, bench_set);
criterion_group!(mixed, bench_random_mix);
criterion_main!(micro_ops, mixed);
