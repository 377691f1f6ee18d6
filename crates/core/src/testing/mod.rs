//! Testing utilities and mock implementations for pipeline tests.
//!
//! This module provides mock implementations of the external collaborator
//! traits, allowing full campaign runs without real skill backends or
//! publishing infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use showrunner_core::testing::{fixtures, MockContentGenerator, MockPublisher, MockTrendFetcher};
//!
//! let fetcher = MockTrendFetcher::with_trends(vec![fixtures::trend("AI Tools")]);
//! let generator = MockContentGenerator::with_cost(2.0);
//! let publisher = MockPublisher::new();
//!
//! // Wire into an ExecutorSet / Router and run the pipeline...
//! ```

mod mock_content_generator;
mod mock_publisher;
mod mock_review_queue;
mod mock_trend_fetcher;

pub use mock_content_generator::{MockContentGenerator, RecordedGeneration};
pub use mock_publisher::MockPublisher;
pub use mock_review_queue::{MockReviewQueue, ReviewEntry};
pub use mock_trend_fetcher::{MockTrendFetcher, RecordedFetch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::campaign::{ConfidenceLevel, ContentArtifact, JudgeVerdict, TaskEnvelope, TaskType};
    use crate::skill::TrendData;

    /// Create a test trend seeded from the topic words.
    pub fn trend(topic: &str) -> TrendData {
        let keywords: Vec<String> = topic
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect();
        TrendData::new(
            format!("trend-{}", topic.to_lowercase().replace(' ', "-")),
            "tiktok",
            topic,
            keywords,
            0.9,
            "US",
        )
        .expect("fixture trend is valid")
    }

    /// Create a trend-research envelope shaped like planner output.
    pub fn trend_task(campaign_id: &str) -> TaskEnvelope {
        TaskEnvelope::new(
            campaign_id,
            TaskType::TrendResearch,
            serde_json::json!({
                "platform": "tiktok",
                "region": "US",
                "limit": 5,
            }),
        )
    }

    /// Create a content-generation envelope shaped like planner output.
    pub fn content_task(campaign_id: &str, topic: &str) -> TaskEnvelope {
        let keywords: Vec<String> = topic
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect();
        TaskEnvelope::new(
            campaign_id,
            TaskType::ContentGeneration,
            serde_json::json!({
                "topic": topic,
                "keywords": keywords,
                "platform": "tiktok",
                "persona": "techGuru",
                "region": "US",
            }),
        )
    }

    /// Create a script artifact that passes the default rule checks.
    pub fn script_artifact(campaign_id: &str, topic: &str) -> ContentArtifact {
        let task = content_task(campaign_id, topic);
        ContentArtifact::for_task(
            &task,
            "short_video_script",
            format!("A quick rundown of {topic} worth watching to the end. #one #two #three"),
            "tiktok",
        )
    }

    /// Create a high-confidence verdict for an artifact.
    pub fn high_verdict(artifact: &ContentArtifact) -> JudgeVerdict {
        verdict_with(artifact, ConfidenceLevel::High)
    }

    /// Create a verdict with the given confidence tier.
    pub fn verdict_with(artifact: &ContentArtifact, confidence: ConfidenceLevel) -> JudgeVerdict {
        JudgeVerdict::new(
            artifact.artifact_id.clone(),
            confidence,
            false,
            "fixture verdict",
        )
    }
}
