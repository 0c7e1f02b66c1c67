//! Error types for syncbench.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when harness or cache parameters are invalid
//!   (e.g. zero capacity, a write band wider than its denominator).
//! - [`InvariantError`]: Returned by debug-only `check_invariants` methods when
//!   an internal data structure is inconsistent.
//! - [`BenchError`]: Everything that can stop a benchmark run. Cache operations
//!   themselves never fail; a stalled run is the only runtime failure class.
//!
//! ## Example Usage
//!
//! ```
//! use syncbench::error::ConfigError;
//! use syncbench::strategy::bounded::BoundedCache;
//!
//! let cache: Result<BoundedCache<u64, u64>, ConfigError> = BoundedCache::try_new(128);
//! assert!(cache.is_ok());
//!
//! let bad = BoundedCache::<u64, u64>::try_new(0);
//! assert!(bad.err().unwrap().to_string().contains("capacity"));
//! ```

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`BoundedCache::try_new`](crate::strategy::bounded::BoundedCache::try_new),
/// [`WorkloadSpec::try_new`](crate::workload::WorkloadSpec::try_new) and
/// [`HarnessConfig::validate`](crate::config::HarnessConfig::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal invariants are violated.
///
/// Produced by [`BoundedLru::check_invariants`](crate::ds::lru::BoundedLru::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// BenchError
// ---------------------------------------------------------------------------

/// Failures that abort a benchmark run or prevent one from starting.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A parameter failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The watchdog expired before every iteration completed.
    ///
    /// This is how a deadlock or unbounded stall in a strategy surfaces. The
    /// run is abandoned, never retried.
    #[error("{label} did not finish within {timeout:?}")]
    Stalled { label: String, timeout: Duration },

    /// An OS thread or the async runtime could not be started.
    #[error("failed to start workers: {0}")]
    Spawn(#[from] std::io::Error),

    /// The fan-out thread pool could not be built.
    #[error("failed to build thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
