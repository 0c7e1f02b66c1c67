//! Harness configuration.
//!
//! | Field              | Type       | Default        | Env override               |
//! |--------------------|------------|----------------|----------------------------|
//! | `iterations`       | `u64`      | 100 000        | `SYNCBENCH_ITERATIONS`     |
//! | `workers`          | `usize`    | CPU count      | `SYNCBENCH_WORKERS`        |
//! | `timeout`          | `Duration` | 120 s          | `SYNCBENCH_TIMEOUT_SECS`   |
//! | `bounded_capacity` | `usize`    | 4096           | -                          |
//! | `mailbox_capacity` | `usize`    | 1024           | -                          |
//! | `name_width`       | `usize`    | 30             | -                          |
//!
//! Nothing is read from files; a host either uses the defaults, sets fields
//! programmatically, or calls [`HarnessConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::strategy::actor::DEFAULT_MAILBOX_CAPACITY;
use crate::strategy::bounded::DEFAULT_CAPACITY;

pub const ENV_ITERATIONS: &str = "SYNCBENCH_ITERATIONS";
pub const ENV_WORKERS: &str = "SYNCBENCH_WORKERS";
pub const ENV_TIMEOUT_SECS: &str = "SYNCBENCH_TIMEOUT_SECS";

/// Parameters shared by every scenario of a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Operations per scenario per strategy.
    pub iterations: u64,
    /// Threads in the fan-out pool and in the async runtime.
    pub workers: usize,
    /// Watchdog limit for one strategy's run.
    pub timeout: Duration,
    /// Entry capacity of the bounded eviction strategy.
    pub bounded_capacity: usize,
    /// Mailbox depth of the actor strategy.
    pub mailbox_capacity: usize,
    /// Column width of strategy names in the text report.
    pub name_width: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: 100_000,
            workers: num_cpus::get(),
            timeout: Duration::from_secs(120),
            bounded_capacity: DEFAULT_CAPACITY,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            name_width: 30,
        }
    }
}

impl HarnessConfig {
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_bounded_capacity(mut self, capacity: usize) -> Self {
        self.bounded_capacity = capacity;
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    pub fn with_name_width(mut self, width: usize) -> Self {
        self.name_width = width;
        self
    }

    /// Checks every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::new("iterations must be > 0"));
        }
        if self.workers == 0 {
            return Err(ConfigError::new("workers must be > 0"));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::new("timeout must be > 0"));
        }
        if self.bounded_capacity == 0 {
            return Err(ConfigError::new("bounded cache capacity must be > 0"));
        }
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::new("mailbox capacity must be > 0"));
        }
        if self.name_width == 0 {
            return Err(ConfigError::new("name width must be > 0"));
        }
        Ok(())
    }

    /// Defaults overridden by the `SYNCBENCH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(iterations) = parse_var(&lookup, ENV_ITERATIONS)? {
            config.iterations = iterations;
        }
        if let Some(workers) = parse_var(&lookup, ENV_WORKERS)? {
            config.workers = workers;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_TIMEOUT_SECS)? {
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err| ConfigError::new(format!("{name}={raw:?}: {err}"))),
    }
}
