//! Mock review queue for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::campaign::{ContentArtifact, JudgeVerdict};
use crate::router::{ReviewQueue, RouterError};

/// A parked artifact together with the verdict that sent it to review.
#[derive(Debug, Clone)]
pub struct ReviewEntry {
    /// The artifact waiting for a human decision.
    pub artifact: ContentArtifact,
    /// The verdict that routed it here.
    pub verdict: JudgeVerdict,
}

/// Mock implementation of the [`ReviewQueue`] trait.
///
/// Provides controllable behavior for testing:
/// - Track enqueued artifacts with their verdicts
/// - Simulate enqueue rejections
///
/// # Example
///
/// ```rust,ignore
/// use showrunner_core::testing::MockReviewQueue;
///
/// let queue = MockReviewQueue::new();
///
/// queue.enqueue(&artifact, &verdict).await?;
/// assert_eq!(queue.pending().await, 1);
///
/// let entries = queue.entries().await;
/// assert_eq!(entries[0].verdict.confidence, ConfidenceLevel::Medium);
/// ```
#[derive(Debug)]
pub struct MockReviewQueue {
    /// Parked artifacts in arrival order.
    entries: Arc<RwLock<Vec<ReviewEntry>>>,
    /// If set, the next enqueue will fail with this reason.
    next_error: Arc<RwLock<Option<String>>>,
}

impl Default for MockReviewQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReviewQueue {
    /// Create a new mock review queue.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all parked entries.
    pub async fn entries(&self) -> Vec<ReviewEntry> {
        self.entries.read().await.clone()
    }

    /// Configure the next enqueue to fail with the given reason.
    pub async fn set_next_error(&self, reason: impl Into<String>) {
        *self.next_error.write().await = Some(reason.into());
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<String> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl ReviewQueue for MockReviewQueue {
    async fn enqueue(
        &self,
        artifact: &ContentArtifact,
        verdict: &JudgeVerdict,
    ) -> Result<(), RouterError> {
        if let Some(reason) = self.take_error().await {
            return Err(RouterError::EnqueueFailed {
                artifact_id: artifact.artifact_id.clone(),
                reason,
            });
        }

        self.entries.write().await.push(ReviewEntry {
            artifact: artifact.clone(),
            verdict: verdict.clone(),
        });
        Ok(())
    }

    async fn pending(&self) -> usize {
        self.entries.read().await.len()
    }
}
