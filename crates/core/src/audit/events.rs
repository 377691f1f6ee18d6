use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // Campaign lifecycle
    CampaignStarted {
        campaign_id: String,
        goal: String,
        budget: f64,
    },
    TasksPlanned {
        campaign_id: String,
        task_count: usize,
        task_types: Vec<String>,
    },
    CampaignCompleted {
        campaign_id: String,
        published: usize,
        queued_for_review: usize,
        abandoned: usize,
        failed: usize,
        total_spent: f64,
        duration_ms: u64,
    },
    CampaignFailed {
        campaign_id: String,
        error: String,
    },

    // Task execution
    TaskDispatched {
        campaign_id: String,
        task_id: String,
        task_type: String,
        version: u64,
    },
    BudgetReserved {
        campaign_id: String,
        task_id: String,
        amount: f64,
        remaining: f64,
    },
    BudgetDenied {
        campaign_id: String,
        task_id: String,
        requested: f64,
        available: f64,
    },
    BudgetReleased {
        campaign_id: String,
        task_id: String,
        amount: f64,
    },
    ArtifactProduced {
        campaign_id: String,
        task_id: String,
        artifact_id: String,
        content_type: String,
        platform: String,
        cost: f64,
        duration_ms: u64,
    },
    TaskFailed {
        campaign_id: String,
        task_id: String,
        task_type: String,
        error: String,
        duration_ms: u64,
    },

    // Judging
    VerdictIssued {
        campaign_id: String,
        task_id: String,
        artifact_id: String,
        confidence: String,
        approved: bool,
        sensitive_topic: bool,
        reason: String,
    },
    StaleSubmissionRejected {
        campaign_id: String,
        task_id: String,
        expected_version: u64,
        submitted_version: u64,
    },

    // Routing
    ArtifactPublished {
        campaign_id: String,
        task_id: String,
        artifact_id: String,
        platform: String,
        external_ref: String,
    },
    ReviewQueued {
        campaign_id: String,
        task_id: String,
        artifact_id: String,
        reason: String,
    },
    ReworkScheduled {
        campaign_id: String,
        task_id: String,
        next_version: u64,
        reason: String,
    },
    ReworkAbandoned {
        campaign_id: String,
        task_id: String,
        cycles: u32,
        last_reason: String,
    },
}

impl AuditEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CampaignStarted { .. } => "campaign_started",
            Self::TasksPlanned { .. } => "tasks_planned",
            Self::CampaignCompleted { .. } => "campaign_completed",
            Self::CampaignFailed { .. } => "campaign_failed",
            Self::TaskDispatched { .. } => "task_dispatched",
            Self::BudgetReserved { .. } => "budget_reserved",
            Self::BudgetDenied { .. } => "budget_denied",
            Self::BudgetReleased { .. } => "budget_released",
            Self::ArtifactProduced { .. } => "artifact_produced",
            Self::TaskFailed { .. } => "task_failed",
            Self::VerdictIssued { .. } => "verdict_issued",
            Self::StaleSubmissionRejected { .. } => "stale_submission_rejected",
            Self::ArtifactPublished { .. } => "artifact_published",
            Self::ReviewQueued { .. } => "review_queued",
            Self::ReworkScheduled { .. } => "rework_scheduled",
            Self::ReworkAbandoned { .. } => "rework_abandoned",
        }
    }

    /// Extract the campaign this event belongs to
    pub fn campaign_id(&self) -> Option<&str> {
        match self {
            Self::CampaignStarted { campaign_id, .. }
            | Self::TasksPlanned { campaign_id, .. }
            | Self::CampaignCompleted { campaign_id, .. }
            | Self::CampaignFailed { campaign_id, .. }
            | Self::TaskDispatched { campaign_id, .. }
            | Self::BudgetReserved { campaign_id, .. }
            | Self::BudgetDenied { campaign_id, .. }
            | Self::BudgetReleased { campaign_id, .. }
            | Self::ArtifactProduced { campaign_id, .. }
            | Self::TaskFailed { campaign_id, .. }
            | Self::VerdictIssued { campaign_id, .. }
            | Self::StaleSubmissionRejected { campaign_id, .. }
            | Self::ArtifactPublished { campaign_id, .. }
            | Self::ReviewQueued { campaign_id, .. }
            | Self::ReworkScheduled { campaign_id, .. }
            | Self::ReworkAbandoned { campaign_id, .. } => Some(campaign_id),
        }
    }

    /// Extract task_id if this event is task-scoped
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::TaskDispatched { task_id, .. }
            | Self::BudgetReserved { task_id, .. }
            | Self::BudgetDenied { task_id, .. }
            | Self::BudgetReleased { task_id, .. }
            | Self::ArtifactProduced { task_id, .. }
            | Self::TaskFailed { task_id, .. }
            | Self::VerdictIssued { task_id, .. }
            | Self::StaleSubmissionRejected { task_id, .. }
            | Self::ArtifactPublished { task_id, .. }
            | Self::ReviewQueued { task_id, .. }
            | Self::ReworkScheduled { task_id, .. }
            | Self::ReworkAbandoned { task_id, .. } => Some(task_id),
            _ => None,
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub campaign_id: Option<String>,
    pub task_id: Option<String>,
    pub data: AuditEvent,
}
