//! Budget-governed task execution.
//!
//! The [`WorkerPool`] runs planned tasks concurrently against the
//! [`TaskExecutor`] registry. Each task reserves its estimated cost from the
//! campaign ledger before the skill runs; unused reservations are returned
//! when the task settles.

mod config;
mod executors;
mod pool;
mod types;

pub use config::WorkerConfig;
pub use executors::{ContentGenerationExecutor, ExecutorSet, TaskExecutor, TrendResearchExecutor};
pub use pool::WorkerPool;
pub use types::{ExecutionOutput, PoolStatus, TaskError, TaskReport};
