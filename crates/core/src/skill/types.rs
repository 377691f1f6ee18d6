//! Types and contracts for the skill system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::campaign::TaskType;

/// Errors that can occur inside a skill invocation.
#[derive(Debug, Error)]
pub enum SkillError {
    /// An argument was blank, missing, or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The generation cost would exceed the budget the worker granted.
    #[error("estimated cost ${requested:.2} exceeds budget ${available:.2}")]
    BudgetExceeded { requested: f64, available: f64 },

    /// The backing service is not reachable right now.
    #[error("skill unavailable: {0}")]
    Unavailable(String),

    /// The backing service answered with an error.
    #[error("backend failure: {0}")]
    Backend(String),
}

// ============================================================================
// Trend Data
// ============================================================================

/// A trending topic observed on a platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendData {
    /// Unique trend identifier, assigned by the fetching skill.
    pub trend_id: String,
    /// Platform the trend was observed on.
    pub platform: String,
    /// Human-readable topic name.
    pub topic: String,
    /// Keywords associated with the trend.
    pub keywords: Vec<String>,
    /// Relevance score in [0.0, 1.0].
    pub relevance_score: f64,
    /// Region the trend applies to.
    pub region: String,
    /// When the trend was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Data version, starts at 1.
    pub version: u64,
}

impl TrendData {
    /// Create a validated trend at version 1.
    ///
    /// Fails if `trend_id` or `platform` is blank or the relevance score is
    /// outside [0.0, 1.0].
    pub fn new(
        trend_id: impl Into<String>,
        platform: impl Into<String>,
        topic: impl Into<String>,
        keywords: Vec<String>,
        relevance_score: f64,
        region: impl Into<String>,
    ) -> Result<Self, SkillError> {
        let trend_id = trend_id.into();
        let platform = platform.into();

        if trend_id.trim().is_empty() {
            return Err(SkillError::InvalidInput("trend id is blank".to_string()));
        }
        if platform.trim().is_empty() {
            return Err(SkillError::InvalidInput("platform is blank".to_string()));
        }
        if !(0.0..=1.0).contains(&relevance_score) || relevance_score.is_nan() {
            return Err(SkillError::InvalidInput(format!(
                "relevance score out of range: {relevance_score}"
            )));
        }

        Ok(Self {
            trend_id,
            platform,
            topic: topic.into(),
            keywords,
            relevance_score,
            region: region.into(),
            fetched_at: Utc::now(),
            version: 1,
        })
    }

    /// Set the data version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

// ============================================================================
// Content Payload
// ============================================================================

/// Generated content returned by a content-generation skill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentPayload {
    /// Unique content identifier (UUID v4).
    pub content_id: String,
    /// Spoken/visual script for the content.
    pub script: String,
    /// Caption to post alongside.
    pub caption: String,
    /// Hashtags to attach.
    pub hashtags: Vec<String>,
    /// Platform the content targets.
    pub platform: String,
    /// Persona the content was written as.
    pub persona: String,
    /// What generating this content cost, non-negative.
    pub estimated_cost: f64,
    /// When the content was generated.
    pub generated_at: DateTime<Utc>,
}

impl ContentPayload {
    /// Create a validated payload with a fresh content id.
    ///
    /// All text fields must be non-blank, at least one hashtag is required,
    /// and the cost must be a finite non-negative number.
    pub fn new(
        script: impl Into<String>,
        caption: impl Into<String>,
        hashtags: Vec<String>,
        platform: impl Into<String>,
        persona: impl Into<String>,
        estimated_cost: f64,
    ) -> Result<Self, SkillError> {
        let script = script.into();
        let caption = caption.into();
        let platform = platform.into();
        let persona = persona.into();

        for (field, value) in [
            ("script", &script),
            ("caption", &caption),
            ("platform", &platform),
            ("persona", &persona),
        ] {
            if value.trim().is_empty() {
                return Err(SkillError::InvalidInput(format!("{field} is blank")));
            }
        }
        if hashtags.is_empty() || hashtags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(SkillError::InvalidInput(
                "at least one non-blank hashtag is required".to_string(),
            ));
        }
        if !estimated_cost.is_finite() || estimated_cost < 0.0 {
            return Err(SkillError::InvalidInput(format!(
                "estimated cost must be a non-negative number, got {estimated_cost}"
            )));
        }

        Ok(Self {
            content_id: Uuid::new_v4().to_string(),
            script,
            caption,
            hashtags,
            platform,
            persona,
            estimated_cost,
            generated_at: Utc::now(),
        })
    }
}

// ============================================================================
// Skill Contracts
// ============================================================================

/// Trait for trend-fetch backends.
#[async_trait]
pub trait TrendFetcherSkill: Send + Sync {
    /// Skill name for logging, audit, and error reports.
    fn name(&self) -> &str;

    /// Whether the backing service is reachable right now.
    async fn is_available(&self) -> bool;

    /// Which task types this skill can execute.
    fn supports(&self, task_type: TaskType) -> bool;

    /// Fetch current trends for a platform and region, at most `limit`.
    async fn fetch_trends(
        &self,
        platform: &str,
        region: &str,
        limit: usize,
    ) -> Result<Vec<TrendData>, SkillError>;
}

/// Trait for content-generation backends.
#[async_trait]
pub trait ContentGeneratorSkill: Send + Sync {
    /// Skill name for logging, audit, and error reports.
    fn name(&self) -> &str;

    /// Whether the backing service is reachable right now.
    async fn is_available(&self) -> bool;

    /// Which task types this skill can execute.
    fn supports(&self, task_type: TaskType) -> bool;

    /// Quote what generating content for this trend will cost.
    ///
    /// Workers reserve this amount against the campaign budget before
    /// calling [`ContentGeneratorSkill::generate`].
    fn estimate_cost(&self, trend: &TrendData) -> f64;

    /// Generate content for a trend under a spend cap.
    ///
    /// Fails with [`SkillError::BudgetExceeded`] when the generation cost
    /// would exceed `budget`.
    async fn generate(
        &self,
        trend: &TrendData,
        persona: &str,
        budget: f64,
    ) -> Result<ContentPayload, SkillError>;
}
