//! syncbench: one key-value cache contract, seven synchronization strategies,
//! and a harness that races them against each other.
//!
//! ## Architecture
//!
//! ```text
//!   registry ──► driver ──► builder::Cache ──► strategy::* ──► table
//!      │           │                              (mutex, unfair, serial_queue,
//!      │           └─ workload::WorkloadSpec       barrier_queue, rwlock,
//!      ▼                                           actor, bounded)
//!   report::Report
//! ```
//!
//! - [`traits`] defines the blocking [`CacheStore`](traits::CacheStore) and
//!   awaiting [`AsyncCacheStore`](traits::AsyncCacheStore) contracts.
//! - [`strategy`] holds one implementation per synchronization mechanism.
//! - [`builder`] selects a strategy at construction time.
//! - [`workload`], [`driver`], [`report`] and [`registry`] make up the harness.

pub mod builder;
pub mod config;
pub mod driver;
pub mod ds;
pub mod error;
pub mod prelude;
pub mod registry;
pub mod report;
pub mod strategy;
pub mod traits;
pub mod workload;
