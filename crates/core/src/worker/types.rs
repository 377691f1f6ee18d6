//! Types for task execution.

use serde::Serialize;
use thiserror::Error;

use crate::budget::BudgetError;
use crate::campaign::{ContentArtifact, TaskType};
use crate::skill::SkillError;

/// Errors that can fail a task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The campaign ledger denied or rejected the reservation.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// The backing skill failed after the reservation was granted.
    #[error("skill {skill} failed: {source}")]
    Skill {
        skill: String,
        #[source]
        source: SkillError,
    },

    /// The task payload could not be decoded, or task output could not be
    /// encoded.
    #[error("payload error for task {task_id}: {reason}")]
    Payload { task_id: String, reason: String },

    /// No executor is registered for this task type.
    #[error("no executor registered for task type {0}")]
    Unsupported(TaskType),

    /// The skill ran past the per-task deadline.
    #[error("task deadline of {deadline_secs}s exceeded")]
    DeadlineExceeded { deadline_secs: u64 },

    /// The task future was cancelled or panicked.
    #[error("task aborted: {0}")]
    Aborted(String),
}

impl TaskError {
    /// Label used for the task outcome metric.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::Budget(_) => "budget_denied",
            Self::Skill { .. } => "skill_failed",
            Self::Payload { .. } => "payload",
            Self::Unsupported(_) => "unsupported",
            Self::DeadlineExceeded { .. } => "deadline",
            Self::Aborted(_) => "aborted",
        }
    }
}

/// What a task executor hands back on success.
#[derive(Debug)]
pub struct ExecutionOutput {
    pub artifact: ContentArtifact,
    /// What the skill actually spent, at most the reserved amount.
    pub cost: f64,
}

/// Outcome of one task attempt.
#[derive(Debug)]
pub struct TaskReport {
    pub task_id: String,
    pub campaign_id: String,
    pub task_type: TaskType,
    pub version: u64,
    pub result: Result<ContentArtifact, TaskError>,
    /// Net amount debited from the campaign ledger for this attempt.
    pub spent: f64,
    pub duration_ms: u64,
}

impl TaskReport {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    pub fn artifact(&self) -> Option<&ContentArtifact> {
        self.result.as_ref().ok()
    }
}

/// Snapshot of worker pool activity.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    pub active_tasks: usize,
    pub queued_tasks: usize,
    pub max_concurrent: usize,
    pub total_completed: u64,
    pub total_failed: u64,
}
