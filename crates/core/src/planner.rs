//! Campaign goal decomposition.
//!
//! The planner turns a high-level goal into the ordered set of task envelopes
//! the worker pool executes. Decomposition is deterministic for a given goal
//! and configuration; only identifiers and timestamps are fresh per call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::campaign::{TaskEnvelope, TaskType};

/// Errors from goal decomposition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Goal text was empty or yielded no usable keywords.
    #[error("invalid goal: {0}")]
    InvalidGoal(String),
}

/// Configuration for the goal planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Platforms to produce content for; one content task per platform.
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,

    /// Persona the content is written as.
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Region used for trend research.
    #[serde(default = "default_region")]
    pub region: String,

    /// How many trends the research task should request.
    #[serde(default = "default_trend_limit")]
    pub trend_limit: usize,

    /// Also plan an engagement task per campaign.
    /// Requires the host to register an engagement executor.
    #[serde(default)]
    pub include_engagement: bool,

    /// Also plan a financial-check task per campaign.
    /// Requires the host to register a financial-check executor.
    #[serde(default)]
    pub include_financial_check: bool,
}

fn default_platforms() -> Vec<String> {
    vec!["tiktok".to_string(), "instagram".to_string()]
}

fn default_persona() -> String {
    "techGuru".to_string()
}

fn default_region() -> String {
    "US".to_string()
}

fn default_trend_limit() -> usize {
    5
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            platforms: default_platforms(),
            persona: default_persona(),
            region: default_region(),
            trend_limit: default_trend_limit(),
            include_engagement: false,
            include_financial_check: false,
        }
    }
}

/// Trait for campaign planners.
pub trait Planner: Send + Sync {
    /// Decompose a goal into an ordered sequence of version-1 envelopes.
    fn decompose(&self, campaign_id: &str, goal: &str) -> Result<Vec<TaskEnvelope>, PlanError>;

    /// Produce the rework successor for a rejected attempt.
    ///
    /// Same logical work, version incremented by 1.
    fn rework(&self, task: &TaskEnvelope) -> TaskEnvelope {
        task.successor()
    }
}

/// Template-based planner.
///
/// Plans one trend-research task, one content-generation task per configured
/// platform, and optional engagement / financial-check stages. Goal keywords
/// are extracted by splitting on non-alphanumeric characters.
pub struct GoalPlanner {
    config: PlannerConfig,
}

impl GoalPlanner {
    /// Create a planner with default config.
    pub fn new() -> Self {
        Self {
            config: PlannerConfig::default(),
        }
    }

    /// Create a planner with custom config.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    fn extract_keywords(goal: &str) -> Vec<String> {
        goal.split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect()
    }
}

impl Default for GoalPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner for GoalPlanner {
    fn decompose(&self, campaign_id: &str, goal: &str) -> Result<Vec<TaskEnvelope>, PlanError> {
        if goal.trim().is_empty() {
            return Err(PlanError::InvalidGoal("goal is empty".to_string()));
        }
        let keywords = Self::extract_keywords(goal);
        if keywords.is_empty() {
            return Err(PlanError::InvalidGoal(format!(
                "no usable keywords in goal '{goal}'"
            )));
        }

        let topic = keywords.join(" ");
        let research_platform = self
            .config
            .platforms
            .first()
            .cloned()
            .unwrap_or_else(|| "tiktok".to_string());

        let mut tasks = vec![TaskEnvelope::new(
            campaign_id,
            TaskType::TrendResearch,
            serde_json::json!({
                "goal": goal,
                "keywords": keywords,
                "platform": research_platform,
                "region": self.config.region,
                "limit": self.config.trend_limit,
            }),
        )];

        for platform in &self.config.platforms {
            tasks.push(TaskEnvelope::new(
                campaign_id,
                TaskType::ContentGeneration,
                serde_json::json!({
                    "goal": goal,
                    "topic": topic,
                    "keywords": keywords,
                    "platform": platform,
                    "persona": self.config.persona,
                    "region": self.config.region,
                }),
            ));
        }

        if self.config.include_engagement {
            tasks.push(TaskEnvelope::new(
                campaign_id,
                TaskType::Engagement,
                serde_json::json!({
                    "goal": goal,
                    "platforms": self.config.platforms,
                }),
            ));
        }

        if self.config.include_financial_check {
            tasks.push(TaskEnvelope::new(
                campaign_id,
                TaskType::FinancialCheck,
                serde_json::json!({
                    "goal": goal,
                }),
            ));
        }

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_decomposition_is_three_tasks() {
        let planner = GoalPlanner::new();
        let tasks = planner.decompose("c-1", "launch-summer-sale").unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].task_type, TaskType::TrendResearch);
        assert_eq!(tasks[1].task_type, TaskType::ContentGeneration);
        assert_eq!(tasks[2].task_type, TaskType::ContentGeneration);
        for task in &tasks {
            assert_eq!(task.version, 1);
            assert_eq!(task.campaign_id, "c-1");
        }
    }

    #[test]
    fn test_decomposition_extracts_keywords() {
        let planner = GoalPlanner::new();
        let tasks = planner.decompose("c-1", "Launch-Summer_Sale").unwrap();

        let keywords = tasks[0].payload["keywords"].clone();
        assert_eq!(keywords, serde_json::json!(["launch", "summer", "sale"]));
        assert_eq!(tasks[1].payload["topic"], "launch summer sale");
    }

    #[test]
    fn test_content_tasks_cover_configured_platforms() {
        let planner = GoalPlanner::new();
        let tasks = planner.decompose("c-1", "spring drop").unwrap();

        assert_eq!(tasks[1].payload["platform"], "tiktok");
        assert_eq!(tasks[2].payload["platform"], "instagram");
        assert_eq!(tasks[1].payload["persona"], "techGuru");
    }

    #[test]
    fn test_task_ids_are_fresh_per_call() {
        let planner = GoalPlanner::new();
        let first = planner.decompose("c-1", "launch-summer-sale").unwrap();
        let second = planner.decompose("c-1", "launch-summer-sale").unwrap();

        for (a, b) in first.iter().zip(&second) {
            assert_ne!(a.task_id, b.task_id);
        }
    }

    #[test]
    fn test_decomposition_is_deterministic_apart_from_ids() {
        let planner = GoalPlanner::new();
        let first = planner.decompose("c-1", "launch-summer-sale").unwrap();
        let second = planner.decompose("c-1", "launch-summer-sale").unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.task_type, b.task_type);
            assert_eq!(a.payload, b.payload);
        }
    }

    #[test]
    fn test_empty_goal_is_rejected() {
        let planner = GoalPlanner::new();
        assert_eq!(
            planner.decompose("c-1", "").unwrap_err(),
            PlanError::InvalidGoal("goal is empty".to_string())
        );
        assert!(matches!(
            planner.decompose("c-1", "   "),
            Err(PlanError::InvalidGoal(_))
        ));
    }

    #[test]
    fn test_goal_without_keywords_is_rejected() {
        let planner = GoalPlanner::new();
        assert!(matches!(
            planner.decompose("c-1", "--- !!!"),
            Err(PlanError::InvalidGoal(_))
        ));
    }

    #[test]
    fn test_optional_stages_extend_the_plan() {
        let config = PlannerConfig {
            include_engagement: true,
            include_financial_check: true,
            ..Default::default()
        };
        let planner = GoalPlanner::with_config(config);
        let tasks = planner.decompose("c-1", "launch-summer-sale").unwrap();

        assert_eq!(tasks.len(), 5);
        assert_eq!(tasks[3].task_type, TaskType::Engagement);
        assert_eq!(tasks[4].task_type, TaskType::FinancialCheck);
    }

    #[test]
    fn test_rework_increments_version_and_keeps_id() {
        let planner = GoalPlanner::new();
        let tasks = planner.decompose("c-1", "launch-summer-sale").unwrap();

        let successor = planner.rework(&tasks[1]);
        assert_eq!(successor.task_id, tasks[1].task_id);
        assert_eq!(successor.version, 2);
        assert_eq!(successor.payload, tasks[1].payload);

        let third = planner.rework(&successor);
        assert_eq!(third.version, 3);
    }

    #[test]
    fn test_single_platform_config_plans_two_tasks() {
        let config = PlannerConfig {
            platforms: vec!["youtube".to_string()],
            ..Default::default()
        };
        let planner = GoalPlanner::with_config(config);
        let tasks = planner.decompose("c-1", "launch").unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].payload["platform"], "youtube");
        assert_eq!(tasks[1].payload["platform"], "youtube");
    }

    #[test]
    fn test_config_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.platforms, vec!["tiktok", "instagram"]);
        assert_eq!(config.persona, "techGuru");
        assert_eq!(config.region, "US");
        assert_eq!(config.trend_limit, 5);
        assert!(!config.include_engagement);
        assert!(!config.include_financial_check);
    }

    #[test]
    fn test_config_deserialize_minimal() {
        let toml = r#"
            persona = "fitCoach"
        "#;
        let config: PlannerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.persona, "fitCoach");
        assert_eq!(config.platforms, vec!["tiktok", "instagram"]);
        assert_eq!(config.trend_limit, 5);
    }
}
