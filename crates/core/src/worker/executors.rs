//! Executors bridge task envelopes to skill invocations.
//!
//! One executor is registered per task type. The built-in executors cover
//! trend research and content generation; hosts register their own for
//! engagement and financial-check tasks via [`ExecutorSet::with_executor`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::campaign::{ContentArtifact, TaskEnvelope, TaskType};
use crate::skill::{ContentGeneratorSkill, SkillError, TrendData, TrendFetcherSkill};

use super::types::{ExecutionOutput, TaskError};

/// Runs tasks of a single type.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Returns the name of this executor implementation.
    fn name(&self) -> &str;

    /// The task type this executor handles.
    fn task_type(&self) -> TaskType;

    /// Amount to reserve from the campaign budget before running the task.
    fn estimate_cost(&self, task: &TaskEnvelope) -> Result<f64, TaskError>;

    /// Run the task. `reserved` is the amount already debited for it and is
    /// the hard cap on what the skill may spend.
    async fn execute(
        &self,
        task: &TaskEnvelope,
        reserved: f64,
    ) -> Result<ExecutionOutput, TaskError>;
}

fn decode_payload<'a, T: Deserialize<'a>>(task: &'a TaskEnvelope) -> Result<T, TaskError> {
    T::deserialize(&task.payload).map_err(|e| TaskError::Payload {
        task_id: task.task_id.clone(),
        reason: e.to_string(),
    })
}

// ============================================================================
// Trend Research
// ============================================================================

#[derive(Debug, Deserialize)]
struct TrendResearchPayload {
    platform: String,
    #[serde(default = "default_region")]
    region: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_region() -> String {
    "US".to_string()
}

fn default_limit() -> usize {
    5
}

/// Executes trend-research tasks through a [`TrendFetcherSkill`].
///
/// The artifact body is the fetched trend list serialized as JSON, typed as
/// a `trend_report`.
pub struct TrendResearchExecutor {
    skill: Arc<dyn TrendFetcherSkill>,
}

impl TrendResearchExecutor {
    pub fn new(skill: Arc<dyn TrendFetcherSkill>) -> Self {
        Self { skill }
    }
}

#[async_trait]
impl TaskExecutor for TrendResearchExecutor {
    fn name(&self) -> &str {
        "trend_research_executor"
    }

    fn task_type(&self) -> TaskType {
        TaskType::TrendResearch
    }

    fn estimate_cost(&self, _task: &TaskEnvelope) -> Result<f64, TaskError> {
        // Trend fetching is not metered.
        Ok(0.0)
    }

    async fn execute(
        &self,
        task: &TaskEnvelope,
        _reserved: f64,
    ) -> Result<ExecutionOutput, TaskError> {
        let payload: TrendResearchPayload = decode_payload(task)?;

        if !self.skill.is_available().await {
            return Err(TaskError::Skill {
                skill: self.skill.name().to_string(),
                source: SkillError::Unavailable("backend reported unavailable".to_string()),
            });
        }

        let trends = self
            .skill
            .fetch_trends(&payload.platform, &payload.region, payload.limit)
            .await
            .map_err(|source| TaskError::Skill {
                skill: self.skill.name().to_string(),
                source,
            })?;

        let body = serde_json::to_string(&trends).map_err(|e| TaskError::Payload {
            task_id: task.task_id.clone(),
            reason: format!("trend report encoding: {e}"),
        })?;

        Ok(ExecutionOutput {
            artifact: ContentArtifact::for_task(task, "trend_report", body, &payload.platform),
            cost: 0.0,
        })
    }
}

// ============================================================================
// Content Generation
// ============================================================================

#[derive(Debug, Deserialize)]
struct ContentGenerationPayload {
    topic: String,
    #[serde(default)]
    keywords: Vec<String>,
    platform: String,
    persona: String,
    #[serde(default = "default_region")]
    region: String,
    #[serde(default)]
    trend_id: Option<String>,
    #[serde(default)]
    relevance_score: Option<f64>,
}

impl ContentGenerationPayload {
    /// Build the trend the generator works from.
    ///
    /// Planners embed the topic and keywords directly in the payload, so the
    /// trend here is a seed rather than a live fetch result.
    fn seed_trend(&self, task: &TaskEnvelope) -> Result<TrendData, TaskError> {
        let trend_id = self
            .trend_id
            .clone()
            .unwrap_or_else(|| format!("planned-{}", task.task_id));
        TrendData::new(
            trend_id,
            &self.platform,
            &self.topic,
            self.keywords.clone(),
            self.relevance_score.unwrap_or(1.0),
            &self.region,
        )
        .map_err(|e| TaskError::Payload {
            task_id: task.task_id.clone(),
            reason: e.to_string(),
        })
    }
}

/// Executes content-generation tasks through a [`ContentGeneratorSkill`].
pub struct ContentGenerationExecutor {
    skill: Arc<dyn ContentGeneratorSkill>,
}

impl ContentGenerationExecutor {
    pub fn new(skill: Arc<dyn ContentGeneratorSkill>) -> Self {
        Self { skill }
    }
}

#[async_trait]
impl TaskExecutor for ContentGenerationExecutor {
    fn name(&self) -> &str {
        "content_generation_executor"
    }

    fn task_type(&self) -> TaskType {
        TaskType::ContentGeneration
    }

    fn estimate_cost(&self, task: &TaskEnvelope) -> Result<f64, TaskError> {
        let payload: ContentGenerationPayload = decode_payload(task)?;
        let trend = payload.seed_trend(task)?;
        Ok(self.skill.estimate_cost(&trend))
    }

    async fn execute(
        &self,
        task: &TaskEnvelope,
        reserved: f64,
    ) -> Result<ExecutionOutput, TaskError> {
        let payload: ContentGenerationPayload = decode_payload(task)?;
        let trend = payload.seed_trend(task)?;

        if !self.skill.is_available().await {
            return Err(TaskError::Skill {
                skill: self.skill.name().to_string(),
                source: SkillError::Unavailable("backend reported unavailable".to_string()),
            });
        }

        let content = self
            .skill
            .generate(&trend, &payload.persona, reserved)
            .await
            .map_err(|source| TaskError::Skill {
                skill: self.skill.name().to_string(),
                source,
            })?;

        let body = format!(
            "{}\n\n{}\n{}",
            content.script,
            content.caption,
            content.hashtags.join(" ")
        );

        Ok(ExecutionOutput {
            artifact: ContentArtifact::for_task(
                task,
                "short_video_script",
                body,
                &content.platform,
            ),
            cost: content.estimated_cost,
        })
    }
}

// ============================================================================
// Executor Registry
// ============================================================================

/// Executors keyed by the task type they handle.
#[derive(Default)]
pub struct ExecutorSet {
    executors: HashMap<TaskType, Arc<dyn TaskExecutor>>,
}

impl ExecutorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a [`TrendResearchExecutor`] over the given skill.
    pub fn with_trend_fetcher(self, skill: Arc<dyn TrendFetcherSkill>) -> Self {
        self.with_executor(Arc::new(TrendResearchExecutor::new(skill)))
    }

    /// Register a [`ContentGenerationExecutor`] over the given skill.
    pub fn with_content_generator(self, skill: Arc<dyn ContentGeneratorSkill>) -> Self {
        self.with_executor(Arc::new(ContentGenerationExecutor::new(skill)))
    }

    /// Register any executor, replacing an earlier one for the same type.
    pub fn with_executor(mut self, executor: Arc<dyn TaskExecutor>) -> Self {
        self.executors.insert(executor.task_type(), executor);
        self
    }

    pub fn get(&self, task_type: TaskType) -> Option<Arc<dyn TaskExecutor>> {
        self.executors.get(&task_type).map(Arc::clone)
    }

    /// Task types with a registered executor, in declaration order.
    pub fn supported(&self) -> Vec<TaskType> {
        TaskType::all()
            .iter()
            .copied()
            .filter(|t| self.executors.contains_key(t))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}
