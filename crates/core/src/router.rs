//! Verdict routing.
//!
//! Every verdict maps to exactly one destination: approved artifacts are
//! published, medium-confidence artifacts go to a human review queue, and
//! low-confidence artifacts are sent back for rework as a successor task.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::campaign::{ConfidenceLevel, ContentArtifact, JudgeVerdict, TaskEnvelope};
use crate::metrics;
use crate::planner::Planner;

/// Errors that can occur while dispatching a routed artifact.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The publishing backend rejected the artifact.
    #[error("publish failed for artifact {artifact_id}: {reason}")]
    PublishFailed { artifact_id: String, reason: String },

    /// The review queue rejected the artifact.
    #[error("review enqueue failed for artifact {artifact_id}: {reason}")]
    EnqueueFailed { artifact_id: String, reason: String },
}

/// Where a judged artifact goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    /// High confidence, publish directly.
    Publish,
    /// Medium confidence, park for human review.
    EnqueueForReview,
    /// Low confidence, regenerate under a bumped version.
    RequeueForRework,
}

impl RouteDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::EnqueueForReview => "review",
            Self::RequeueForRework => "rework",
        }
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a verdict's confidence to its destination.
///
/// Total over all confidence levels, so no verdict is ever dropped.
pub fn route(confidence: ConfidenceLevel) -> RouteDecision {
    match confidence {
        ConfidenceLevel::High => RouteDecision::Publish,
        ConfidenceLevel::Medium => RouteDecision::EnqueueForReview,
        ConfidenceLevel::Low => RouteDecision::RequeueForRework,
    }
}

/// Proof that an artifact went out, as reported by the publishing backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub artifact_id: String,
    pub platform: String,
    /// Backend-assigned reference, such as a post id or URL.
    pub external_ref: String,
    pub published_at: DateTime<Utc>,
}

/// A backend that can push approved artifacts to their platform.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns the name of this publisher implementation.
    fn name(&self) -> &str;

    /// Publishes an approved artifact.
    async fn publish(
        &self,
        artifact: &ContentArtifact,
        verdict: &JudgeVerdict,
    ) -> Result<PublishReceipt, RouterError>;
}

/// A queue holding artifacts that need a human decision.
#[async_trait]
pub trait ReviewQueue: Send + Sync {
    /// Parks an artifact together with the verdict that sent it here.
    async fn enqueue(
        &self,
        artifact: &ContentArtifact,
        verdict: &JudgeVerdict,
    ) -> Result<(), RouterError>;

    /// Number of artifacts currently waiting for review.
    async fn pending(&self) -> usize;
}

/// Outcome of dispatching one judged artifact.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The artifact was published.
    Published(PublishReceipt),
    /// The artifact is waiting for human review.
    QueuedForReview,
    /// A successor task was issued for regeneration.
    Requeued { successor: TaskEnvelope },
}

/// Dispatches judged artifacts to their destinations.
pub struct Router {
    publisher: Arc<dyn Publisher>,
    review_queue: Arc<dyn ReviewQueue>,
    planner: Arc<dyn Planner>,
}

impl Router {
    pub fn new(
        publisher: Arc<dyn Publisher>,
        review_queue: Arc<dyn ReviewQueue>,
        planner: Arc<dyn Planner>,
    ) -> Self {
        Self {
            publisher,
            review_queue,
            planner,
        }
    }

    /// Routes one verdict and carries out the side of the decision.
    ///
    /// Rework never touches the backends: the successor envelope is returned
    /// to the caller, which owns the retry loop and its cycle cap.
    pub async fn dispatch(
        &self,
        task: &TaskEnvelope,
        artifact: &ContentArtifact,
        verdict: &JudgeVerdict,
    ) -> Result<RouteOutcome, RouterError> {
        let decision = route(verdict.confidence);
        metrics::ROUTES.with_label_values(&[decision.as_str()]).inc();

        match decision {
            RouteDecision::Publish => {
                let receipt = self.publisher.publish(artifact, verdict).await?;
                tracing::info!(
                    artifact_id = %artifact.artifact_id,
                    platform = %receipt.platform,
                    external_ref = %receipt.external_ref,
                    publisher = self.publisher.name(),
                    "artifact published"
                );
                Ok(RouteOutcome::Published(receipt))
            }
            RouteDecision::EnqueueForReview => {
                self.review_queue.enqueue(artifact, verdict).await?;
                tracing::info!(
                    artifact_id = %artifact.artifact_id,
                    reason = %verdict.reason,
                    "artifact queued for review"
                );
                Ok(RouteOutcome::QueuedForReview)
            }
            RouteDecision::RequeueForRework => {
                let successor = self.planner.rework(task);
                metrics::REWORK_CYCLES.inc();
                tracing::info!(
                    task_id = %successor.task_id,
                    version = successor.version,
                    reason = %verdict.reason,
                    "artifact requeued for rework"
                );
                Ok(RouteOutcome::Requeued { successor })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::TaskType;
    use crate::planner::GoalPlanner;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingPublisher {
        calls: AtomicUsize,
        fail: bool,
    }

    impl RecordingPublisher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn publish(
            &self,
            artifact: &ContentArtifact,
            _verdict: &JudgeVerdict,
        ) -> Result<PublishReceipt, RouterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RouterError::PublishFailed {
                    artifact_id: artifact.artifact_id.clone(),
                    reason: "backend down".to_string(),
                });
            }
            Ok(PublishReceipt {
                artifact_id: artifact.artifact_id.clone(),
                platform: artifact.platform.clone(),
                external_ref: format!("post-{}", artifact.artifact_id),
                published_at: Utc::now(),
            })
        }
    }

    struct RecordingQueue {
        calls: AtomicUsize,
    }

    impl RecordingQueue {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReviewQueue for RecordingQueue {
        async fn enqueue(
            &self,
            _artifact: &ContentArtifact,
            _verdict: &JudgeVerdict,
        ) -> Result<(), RouterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn pending(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn fixtures() -> (TaskEnvelope, ContentArtifact) {
        let task = TaskEnvelope::new("c-1", TaskType::ContentGeneration, serde_json::json!({}));
        let artifact = ContentArtifact::for_task(
            &task,
            "short_video_script",
            "A script body. #one #two #three",
            "tiktok",
        );
        (task, artifact)
    }

    fn verdict_with(artifact: &ContentArtifact, confidence: ConfidenceLevel) -> JudgeVerdict {
        JudgeVerdict::new(&artifact.artifact_id, confidence, false, "test")
    }

    #[test]
    fn test_route_covers_every_confidence_level() {
        assert_eq!(route(ConfidenceLevel::High), RouteDecision::Publish);
        assert_eq!(
            route(ConfidenceLevel::Medium),
            RouteDecision::EnqueueForReview
        );
        assert_eq!(route(ConfidenceLevel::Low), RouteDecision::RequeueForRework);
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(RouteDecision::Publish.as_str(), "publish");
        assert_eq!(RouteDecision::EnqueueForReview.as_str(), "review");
        assert_eq!(RouteDecision::RequeueForRework.to_string(), "rework");
    }

    #[tokio::test]
    async fn test_high_confidence_publishes() {
        let publisher = Arc::new(RecordingPublisher::new());
        let queue = Arc::new(RecordingQueue::new());
        let router = Router::new(
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            Arc::clone(&queue) as Arc<dyn ReviewQueue>,
            Arc::new(GoalPlanner::new()),
        );
        let (task, artifact) = fixtures();
        let verdict = verdict_with(&artifact, ConfidenceLevel::High);

        let outcome = router.dispatch(&task, &artifact, &verdict).await.unwrap();
        match outcome {
            RouteOutcome::Published(receipt) => {
                assert_eq!(receipt.artifact_id, artifact.artifact_id);
                assert_eq!(receipt.platform, "tiktok");
            }
            other => panic!("expected Published, got {other:?}"),
        }
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(queue.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_medium_confidence_goes_to_review() {
        let publisher = Arc::new(RecordingPublisher::new());
        let queue = Arc::new(RecordingQueue::new());
        let router = Router::new(
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            Arc::clone(&queue) as Arc<dyn ReviewQueue>,
            Arc::new(GoalPlanner::new()),
        );
        let (task, artifact) = fixtures();
        let verdict = verdict_with(&artifact, ConfidenceLevel::Medium);

        let outcome = router.dispatch(&task, &artifact, &verdict).await.unwrap();
        assert!(matches!(outcome, RouteOutcome::QueuedForReview));
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(queue.pending().await, 1);
    }

    #[tokio::test]
    async fn test_low_confidence_requeues_a_successor() {
        let router = Router::new(
            Arc::new(RecordingPublisher::new()),
            Arc::new(RecordingQueue::new()),
            Arc::new(GoalPlanner::new()),
        );
        let (task, artifact) = fixtures();
        let verdict = verdict_with(&artifact, ConfidenceLevel::Low);

        let outcome = router.dispatch(&task, &artifact, &verdict).await.unwrap();
        match outcome {
            RouteOutcome::Requeued { successor } => {
                assert_eq!(successor.task_id, task.task_id);
                assert_eq!(successor.version, task.version + 1);
            }
            other => panic!("expected Requeued, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces_as_error() {
        let router = Router::new(
            Arc::new(RecordingPublisher::failing()),
            Arc::new(RecordingQueue::new()),
            Arc::new(GoalPlanner::new()),
        );
        let (task, artifact) = fixtures();
        let verdict = verdict_with(&artifact, ConfidenceLevel::High);

        let err = router
            .dispatch(&task, &artifact, &verdict)
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::PublishFailed { .. }));
        assert!(err.to_string().contains("backend down"));
    }
}
