//! Synchronization strategies implementing [`CacheStore`](crate::traits::CacheStore).
//!
//! | Strategy             | File               | Mechanism                          | Ordering                  |
//! |----------------------|--------------------|------------------------------------|---------------------------|
//! | `MutexCache`         | `mutex.rs`         | `std::sync::Mutex`                 | total                     |
//! | `UnfairLockCache`    | `unfair.rs`        | `parking_lot::Mutex` (barging)     | total                     |
//! | `SerialQueueCache`   | `serial_queue.rs`  | one FIFO worker thread             | total                     |
//! | `BarrierQueueCache`  | `barrier_queue.rs` | worker pool, writes as barriers    | write-write, write→read   |
//! | `RwLockCache`        | `rwlock.rs`        | `parking_lot::RwLock`              | write-write, write→read   |
//! | `ActorCache`         | `actor.rs`         | tokio task + mailbox               | total                     |
//! | `BoundedCache`       | `bounded.rs`       | LRU behind `parking_lot::Mutex`    | total, may evict          |

pub mod actor;
pub mod barrier_queue;
pub mod bounded;
pub mod mutex;
pub mod rwlock;
pub mod serial_queue;
pub mod unfair;

pub use actor::ActorCache;
pub use barrier_queue::BarrierQueueCache;
pub use bounded::BoundedCache;
pub use mutex::MutexCache;
pub use rwlock::RwLockCache;
pub use serial_queue::SerialQueueCache;
pub use unfair::UnfairLockCache;
