//! Campaign domain types: task envelopes, artifacts, and verdicts.
//!
//! Everything in this module is immutable once constructed. A rework cycle
//! never mutates an envelope in place; it goes through
//! [`TaskEnvelope::successor`] which issues a new envelope at the next
//! version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Task Types
// ============================================================================

/// The kind of work a task envelope carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Research trending topics on a platform.
    TrendResearch,
    /// Generate a piece of content for a platform.
    ContentGeneration,
    /// Plan engagement activity around published content.
    Engagement,
    /// Verify campaign spend against external records.
    FinancialCheck,
}

impl TaskType {
    /// Returns the task type as a string for storage and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::TrendResearch => "trend_research",
            TaskType::ContentGeneration => "content_generation",
            TaskType::Engagement => "engagement",
            TaskType::FinancialCheck => "financial_check",
        }
    }

    /// All known task types.
    pub fn all() -> [TaskType; 4] {
        [
            TaskType::TrendResearch,
            TaskType::ContentGeneration,
            TaskType::Engagement,
            TaskType::FinancialCheck,
        ]
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Confidence
// ============================================================================

/// Confidence tier assigned by the judge, driving routing.
///
/// High auto-publishes, Medium queues for human review, Low rejects the
/// artifact and triggers rework.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Returns the tier as a string for storage and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Task Envelope
// ============================================================================

/// One unit of work produced by the planner.
///
/// Versions start at 1 and advance only through [`TaskEnvelope::successor`].
/// The version guard keys its expectation on `task_id`, so a successor keeps
/// the id of the envelope it replaces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskEnvelope {
    /// Unique task identifier (UUID v4).
    pub task_id: String,
    /// Campaign this task belongs to.
    pub campaign_id: String,
    /// What kind of work this is.
    pub task_type: TaskType,
    /// Opaque work description, interpreted by the executing skill.
    pub payload: serde_json::Value,
    /// Submission version, starts at 1.
    pub version: u64,
    /// When the envelope was created.
    pub created_at: DateTime<Utc>,
}

impl TaskEnvelope {
    /// Create a fresh envelope at version 1.
    pub fn new(
        campaign_id: impl Into<String>,
        task_type: TaskType,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            task_id: Uuid::new_v4().to_string(),
            campaign_id: campaign_id.into(),
            task_type,
            payload,
            version: 1,
            created_at: Utc::now(),
        }
    }

    /// Create the rework successor for this envelope.
    ///
    /// Same task id, same payload, version incremented by 1, fresh timestamp.
    pub fn successor(&self) -> Self {
        Self {
            task_id: self.task_id.clone(),
            campaign_id: self.campaign_id.clone(),
            task_type: self.task_type,
            payload: self.payload.clone(),
            version: self.version + 1,
            created_at: Utc::now(),
        }
    }

    /// Whether this envelope was produced by a rework cycle.
    pub fn is_rework(&self) -> bool {
        self.version > 1
    }
}

// ============================================================================
// Content Artifact
// ============================================================================

/// Output of executing one task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentArtifact {
    /// Unique artifact identifier (UUID v4).
    pub artifact_id: String,
    /// Task that produced this artifact.
    pub task_id: String,
    /// Campaign this artifact belongs to.
    pub campaign_id: String,
    /// Kind of content, e.g. "trend_report" or "short_video_script".
    pub content_type: String,
    /// The content itself, shape depends on `content_type`.
    pub content_body: String,
    /// Platform this content targets.
    pub platform: String,
    /// When the artifact was generated.
    pub generated_at: DateTime<Utc>,
    /// Version copied from the producing task envelope.
    pub version: u64,
}

impl ContentArtifact {
    /// Create an artifact for a task, copying its ids and version.
    pub fn for_task(
        task: &TaskEnvelope,
        content_type: impl Into<String>,
        content_body: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            artifact_id: Uuid::new_v4().to_string(),
            task_id: task.task_id.clone(),
            campaign_id: task.campaign_id.clone(),
            content_type: content_type.into(),
            content_body: content_body.into(),
            platform: platform.into(),
            generated_at: Utc::now(),
            version: task.version,
        }
    }
}

// ============================================================================
// Judge Verdict
// ============================================================================

/// The judge's decision about a single artifact. Append-only record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JudgeVerdict {
    /// Unique verdict identifier (UUID v4).
    pub verdict_id: String,
    /// Artifact this verdict is about.
    pub artifact_id: String,
    /// Assigned confidence tier.
    pub confidence: ConfidenceLevel,
    /// Whether the content touched a configured sensitive topic.
    pub sensitive_topic: bool,
    /// Approval flag, true exactly when confidence is High.
    pub approved: bool,
    /// Human-readable explanation of the decision.
    pub reason: String,
    /// When the judgment was made.
    pub judged_at: DateTime<Utc>,
}

impl JudgeVerdict {
    /// Create a verdict for an artifact.
    ///
    /// `approved` is derived from the confidence tier, never set directly.
    pub fn new(
        artifact_id: impl Into<String>,
        confidence: ConfidenceLevel,
        sensitive_topic: bool,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            verdict_id: Uuid::new_v4().to_string(),
            artifact_id: artifact_id.into(),
            confidence,
            sensitive_topic,
            approved: confidence == ConfidenceLevel::High,
            reason: reason.into(),
            judged_at: Utc::now(),
        }
    }
}
