//! Types for the campaign pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::budget::BudgetError;
use crate::campaign::TaskType;
use crate::planner::PlanError;
use crate::router::PublishReceipt;

/// Errors that fail an entire campaign run.
///
/// Per-task problems never surface here; they are recorded in the task
/// summaries of the [`CampaignReport`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Goal decomposition failed.
    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),

    /// The campaign ledger could not be opened.
    #[error("budget ledger error: {0}")]
    Budget(#[from] BudgetError),
}

/// Request to run one campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignBrief {
    /// Unique campaign identifier.
    pub campaign_id: String,
    /// What the campaign should achieve, e.g. "launch-summer-sale".
    pub goal: String,
    /// Total spend allowed for the campaign, in dollars.
    pub budget: f64,
}

impl CampaignBrief {
    /// Create a brief with a generated campaign id.
    pub fn new(goal: impl Into<String>, budget: f64) -> Self {
        Self {
            campaign_id: format!("campaign-{}", Uuid::new_v4()),
            goal: goal.into(),
            budget,
        }
    }

    /// Create a brief with a caller-chosen campaign id.
    pub fn with_id(campaign_id: impl Into<String>, goal: impl Into<String>, budget: f64) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            goal: goal.into(),
            budget,
        }
    }
}

/// Final disposition of one planned task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskDisposition {
    /// An artifact from this task was published.
    Published,
    /// An artifact is parked for human review.
    QueuedForReview,
    /// The rework cap was hit without an acceptable artifact.
    Abandoned,
    /// Execution or dispatch failed.
    Failed,
}

impl TaskDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::QueuedForReview => "queued_for_review",
            Self::Abandoned => "abandoned",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one planned task ended up.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    /// Task identifier, stable across rework versions.
    pub task_id: String,
    pub task_type: TaskType,
    /// Version of the final attempt.
    pub final_version: u64,
    pub disposition: TaskDisposition,
    /// Rework cycles consumed.
    pub rework_cycles: u32,
    /// Dollars spent across all attempts.
    pub spent: f64,
    /// Last verdict reason or error message.
    pub detail: String,
}

/// Outcome of one campaign run.
#[derive(Debug, Serialize)]
pub struct CampaignReport {
    pub campaign_id: String,
    pub goal: String,
    /// One summary per planned task, in completion order.
    pub tasks: Vec<TaskSummary>,
    /// Receipts for everything that went out.
    pub published: Vec<PublishReceipt>,
    /// Dollars debited from the campaign ledger over the run.
    pub total_spent: f64,
    /// Ledger balance when the run finished.
    pub remaining_budget: f64,
    pub duration_ms: u64,
}

impl CampaignReport {
    pub fn published_count(&self) -> usize {
        self.count(TaskDisposition::Published)
    }

    pub fn review_count(&self) -> usize {
        self.count(TaskDisposition::QueuedForReview)
    }

    pub fn abandoned_count(&self) -> usize {
        self.count(TaskDisposition::Abandoned)
    }

    pub fn failed_count(&self) -> usize {
        self.count(TaskDisposition::Failed)
    }

    fn count(&self, disposition: TaskDisposition) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.disposition == disposition)
            .count()
    }
}
