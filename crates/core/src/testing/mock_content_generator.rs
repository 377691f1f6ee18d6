//! Mock content generator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::campaign::TaskType;
use crate::skill::{ContentGeneratorSkill, ContentPayload, SkillError, TrendData};

/// A recorded generation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    /// Trend the content was generated for.
    pub trend_id: String,
    /// Persona the content was written as.
    pub persona: String,
    /// Spend cap the caller passed in.
    pub budget: f64,
}

/// Mock implementation of the [`ContentGeneratorSkill`] trait.
///
/// Provides controllable behavior for testing:
/// - Quote a fixed cost and honor the caller's spend cap
/// - Derive hashtags from the trend keywords, so fixtures steer the rule checks
/// - Track generations for assertions
/// - Simulate failures and unavailability
///
/// # Example
///
/// ```rust,ignore
/// use showrunner_core::testing::{fixtures, MockContentGenerator};
///
/// let generator = MockContentGenerator::with_cost(2.0);
///
/// let content = generator
///     .generate(&fixtures::trend("AI Tools"), "tech-bro", 10.0)
///     .await?;
/// assert_eq!(content.estimated_cost, 2.0);
///
/// let generations = generator.recorded_generations().await;
/// assert_eq!(generations[0].persona, "tech-bro");
/// ```
#[derive(Debug)]
pub struct MockContentGenerator {
    /// Flat quote returned by `estimate_cost` and charged per generation.
    cost: f64,
    /// Recorded generations.
    generations: Arc<RwLock<Vec<RecordedGeneration>>>,
    /// If set, the next generation will fail with this error.
    next_error: Arc<RwLock<Option<SkillError>>>,
    /// Whether the backend reports itself reachable.
    available: Arc<RwLock<bool>>,
}

impl Default for MockContentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockContentGenerator {
    /// Create a new mock generator quoting 1.00 per generation.
    pub fn new() -> Self {
        Self::with_cost(1.0)
    }

    /// Create a mock generator quoting a fixed cost per generation.
    pub fn with_cost(cost: f64) -> Self {
        Self {
            cost,
            generations: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            available: Arc::new(RwLock::new(true)),
        }
    }

    /// Get recorded generations.
    pub async fn recorded_generations(&self) -> Vec<RecordedGeneration> {
        self.generations.read().await.clone()
    }

    /// Get the number of generations performed.
    pub async fn generation_count(&self) -> usize {
        self.generations.read().await.len()
    }

    /// Configure the next generation to fail with the given error.
    pub async fn set_next_error(&self, error: SkillError) {
        *self.next_error.write().await = Some(error);
    }

    /// Toggle the availability reported to callers.
    pub async fn set_available(&self, available: bool) {
        *self.available.write().await = available;
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<SkillError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl ContentGeneratorSkill for MockContentGenerator {
    fn name(&self) -> &str {
        "mock_content_generator"
    }

    async fn is_available(&self) -> bool {
        *self.available.read().await
    }

    fn supports(&self, task_type: TaskType) -> bool {
        task_type == TaskType::ContentGeneration
    }

    fn estimate_cost(&self, _trend: &TrendData) -> f64 {
        self.cost
    }

    async fn generate(
        &self,
        trend: &TrendData,
        persona: &str,
        budget: f64,
    ) -> Result<ContentPayload, SkillError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if self.cost > budget {
            return Err(SkillError::BudgetExceeded {
                requested: self.cost,
                available: budget,
            });
        }

        self.generations.write().await.push(RecordedGeneration {
            trend_id: trend.trend_id.clone(),
            persona: persona.to_string(),
            budget,
        });

        let mut hashtags: Vec<String> = trend
            .keywords
            .iter()
            .map(|k| format!("#{}", k.to_lowercase().replace(' ', "")))
            .collect();
        if hashtags.is_empty() {
            hashtags.push("#trending".to_string());
        }

        ContentPayload::new(
            format!(
                "A take on {} written as {} would say it, long enough to read aloud.",
                trend.topic, persona
            ),
            format!("{} in thirty seconds.", trend.topic),
            hashtags,
            trend.platform.clone(),
            persona,
            self.cost,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_generates_content_with_keyword_hashtags() {
        let generator = MockContentGenerator::new();
        let trend = fixtures::trend("AI Tools");

        let content = generator.generate(&trend, "tech-bro", 10.0).await.unwrap();
        assert!(content.script.contains("AI Tools"));
        assert_eq!(content.hashtags, vec!["#ai", "#tools"]);
        assert_eq!(content.estimated_cost, 1.0);
    }

    #[tokio::test]
    async fn test_spend_cap_is_enforced() {
        let generator = MockContentGenerator::with_cost(5.0);
        let trend = fixtures::trend("AI Tools");

        let err = generator.generate(&trend, "tech-bro", 2.0).await.unwrap_err();
        match err {
            SkillError::BudgetExceeded { requested, available } => {
                assert_eq!(requested, 5.0);
                assert_eq!(available, 2.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(generator.generation_count().await, 0);
    }

    #[tokio::test]
    async fn test_generations_are_recorded() {
        let generator = MockContentGenerator::new();
        let trend = fixtures::trend("AI Tools");

        generator.generate(&trend, "educator", 10.0).await.unwrap();

        let generations = generator.recorded_generations().await;
        assert_eq!(generations.len(), 1);
        assert_eq!(generations[0].trend_id, trend.trend_id);
        assert_eq!(generations[0].persona, "educator");
        assert_eq!(generations[0].budget, 10.0);
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let generator = MockContentGenerator::new();
        generator
            .set_next_error(SkillError::Unavailable("model offline".to_string()))
            .await;
        let trend = fixtures::trend("AI Tools");

        assert!(generator.generate(&trend, "tech-bro", 10.0).await.is_err());
        assert!(generator.generate(&trend, "tech-bro", 10.0).await.is_ok());
    }

    #[tokio::test]
    async fn test_trend_without_keywords_still_produces_a_hashtag() {
        let generator = MockContentGenerator::new();
        let mut trend = fixtures::trend("Minimalism");
        trend.keywords.clear();

        let content = generator.generate(&trend, "educator", 10.0).await.unwrap();
        assert_eq!(content.hashtags, vec!["#trending"]);
    }
}
