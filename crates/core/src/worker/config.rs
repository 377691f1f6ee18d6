//! Worker pool configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the task worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// How many tasks may run at the same time.
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// Per-task deadline in seconds. The clock covers only the skill
    /// invocation, not time spent queued for a worker slot.
    #[serde(default = "default_task_deadline_secs")]
    pub task_deadline_secs: u64,
}

fn default_max_concurrent_tasks() -> usize {
    8
}

fn default_task_deadline_secs() -> u64 {
    30
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: default_max_concurrent_tasks(),
            task_deadline_secs: default_task_deadline_secs(),
        }
    }
}
