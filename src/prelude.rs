pub use crate::builder::{Cache, CacheBuilder, Execution, Strategy};
pub use crate::config::HarnessConfig;
pub use crate::driver::{Driver, RunOutcome};
pub use crate::error::{BenchError, ConfigError};
pub use crate::registry::{
    STANDARD_SCENARIOS, ScenarioCase, ScenarioRun, find_scenario, run_scenario,
};
pub use crate::report::{Report, ResultCollector, TimingResult};
pub use crate::strategy::{
    ActorCache, BarrierQueueCache, BoundedCache, MutexCache, RwLockCache, SerialQueueCache,
    UnfairLockCache,
};
pub use crate::traits::{AsyncCacheStore, CacheStore};
pub use crate::workload::{KeyPattern, OpKind, OpMix, Operation, WorkloadSpec};
