//! Deterministic workload generation.
//!
//! A [`WorkloadSpec`] maps each iteration index `i` in `[0, iterations)` to
//! one [`Operation`] with no shared state, so iterations can be dispatched to
//! any execution unit in any order and still describe the same workload.
//!
//! ```text
//!   i ──► OpMix::kind(i)          ──► Read | Write | WriteThenRead
//!   i ──► KeyPattern::key(i, n)   ──► key
//!   i ──────────────────────────────► value (write payload)
//! ```
//!
//! The write payload is the iteration index itself. A value read back from a
//! cache can therefore be traced to the iteration that wrote it, which is what
//! [`WorkloadSpec::could_have_written`] does.

use serde::Serialize;

use crate::error::ConfigError;

/// What an iteration does to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpKind {
    Read,
    Write,
    /// `set(key, value)` followed by `get(key)`.
    WriteThenRead,
}

/// One iteration's request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub kind: OpKind,
    pub key: u64,
    /// Payload for the write half; unused by reads.
    pub value: u64,
}

/// Read/write classification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpMix {
    /// Iteration `i` writes iff `write_start <= i % denominator < write_end`.
    Banded {
        denominator: u64,
        write_start: u64,
        write_end: u64,
    },
    /// Every iteration writes then reads the same key.
    RoundTrip,
}

impl OpMix {
    /// 75% writes: only `i % 4 == 0` reads.
    pub const fn write_heavy() -> Self {
        OpMix::Banded {
            denominator: 4,
            write_start: 1,
            write_end: 4,
        }
    }

    /// 25% writes: only `i % 4 == 0` writes.
    pub const fn read_heavy() -> Self {
        OpMix::Banded {
            denominator: 4,
            write_start: 0,
            write_end: 1,
        }
    }

    /// 50% writes: even iterations write.
    pub const fn balanced() -> Self {
        OpMix::Banded {
            denominator: 2,
            write_start: 0,
            write_end: 1,
        }
    }

    #[inline]
    pub fn kind(&self, i: u64) -> OpKind {
        match *self {
            OpMix::Banded {
                denominator,
                write_start,
                write_end,
            } => {
                let slot = i % denominator;
                if (write_start..write_end).contains(&slot) {
                    OpKind::Write
                } else {
                    OpKind::Read
                }
            },
            OpMix::RoundTrip => OpKind::WriteThenRead,
        }
    }

    /// Share of iterations that write, in `[0, 1]`.
    pub fn write_fraction(&self) -> f64 {
        match *self {
            OpMix::Banded {
                denominator,
                write_start,
                write_end,
            } => (write_end - write_start) as f64 / denominator as f64,
            OpMix::RoundTrip => 1.0,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let OpMix::Banded {
            denominator,
            write_start,
            write_end,
        } = *self
        {
            if denominator == 0 {
                return Err(ConfigError::new("op mix denominator must be > 0"));
            }
            if write_start > write_end || write_end > denominator {
                return Err(ConfigError::new(format!(
                    "write band [{write_start}, {write_end}) must lie within [0, {denominator})"
                )));
            }
        }
        Ok(())
    }
}

/// Key selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyPattern {
    /// `i % key_space`; a small key space means high contention.
    Modulo,
    /// `i`; every iteration touches a fresh key.
    Sequential,
    /// Every `cold_every`-th iteration targets a key outside the first
    /// `hot_keys`; all others target `i % hot_keys`.
    HotSet { hot_keys: u64, cold_every: u64 },
}

impl KeyPattern {
    #[inline]
    pub fn key(&self, i: u64, key_space: u64) -> u64 {
        match *self {
            KeyPattern::Modulo => i % key_space,
            KeyPattern::Sequential => i,
            KeyPattern::HotSet {
                hot_keys,
                cold_every,
            } => {
                if i % cold_every == 0 {
                    hot_keys + (i / cold_every) % (key_space - hot_keys)
                } else {
                    i % hot_keys
                }
            },
        }
    }

    fn validate(&self, key_space: u64) -> Result<(), ConfigError> {
        if let KeyPattern::HotSet {
            hot_keys,
            cold_every,
        } = *self
        {
            if hot_keys == 0 || hot_keys >= key_space {
                return Err(ConfigError::new(format!(
                    "hot set of {hot_keys} keys must be non-empty and smaller than key space {key_space}"
                )));
            }
            if cold_every == 0 {
                return Err(ConfigError::new("cold_every must be > 0"));
            }
        }
        Ok(())
    }
}

/// Immutable description of one scenario's workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkloadSpec {
    iterations: u64,
    key_space: u64,
    mix: OpMix,
    pattern: KeyPattern,
    prepopulate: u64,
}

impl WorkloadSpec {
    /// Validates and builds a spec with no pre-population.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `iterations` or `key_space` is zero, or if
    /// `mix` or `pattern` is inconsistent with them.
    pub fn try_new(
        iterations: u64,
        key_space: u64,
        mix: OpMix,
        pattern: KeyPattern,
    ) -> Result<Self, ConfigError> {
        if iterations == 0 {
            return Err(ConfigError::new("iterations must be > 0"));
        }
        if key_space == 0 {
            return Err(ConfigError::new("key space must be > 0"));
        }
        mix.validate()?;
        pattern.validate(key_space)?;
        Ok(Self {
            iterations,
            key_space,
            mix,
            pattern,
            prepopulate: 0,
        })
    }

    /// Adds a pre-population step writing `set(k, k)` for `k` in `[0, count)`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `count` exceeds the key space.
    pub fn with_prepopulate(mut self, count: u64) -> Result<Self, ConfigError> {
        if count > self.key_space {
            return Err(ConfigError::new(format!(
                "prepopulate {count} exceeds key space {}",
                self.key_space
            )));
        }
        self.prepopulate = count;
        Ok(self)
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn key_space(&self) -> u64 {
        self.key_space
    }

    pub fn mix(&self) -> OpMix {
        self.mix
    }

    pub fn pattern(&self) -> KeyPattern {
        self.pattern
    }

    pub fn prepopulate(&self) -> u64 {
        self.prepopulate
    }

    /// The request for iteration `i`.
    #[inline]
    pub fn operation(&self, i: u64) -> Operation {
        Operation {
            kind: self.mix.kind(i),
            key: self.pattern.key(i, self.key_space),
            value: i,
        }
    }

    /// Whether `value` read under `key` was ever written by this workload,
    /// either during pre-population or by some measured iteration.
    pub fn could_have_written(&self, key: u64, value: u64) -> bool {
        if value == key && key < self.prepopulate {
            return true;
        }
        if value >= self.iterations {
            return false;
        }
        let origin = self.operation(value);
        origin.kind != OpKind::Read && origin.key == key
    }
}
