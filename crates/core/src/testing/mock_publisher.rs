//! Mock publisher for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::campaign::{ContentArtifact, JudgeVerdict};
use crate::router::{PublishReceipt, Publisher, RouterError};

/// Mock implementation of the [`Publisher`] trait.
///
/// Provides controllable behavior for testing:
/// - Track published artifacts for assertions
/// - Issue serial external refs (`post-1`, `post-2`, ...)
/// - Simulate backend rejections
///
/// # Example
///
/// ```rust,ignore
/// use showrunner_core::testing::MockPublisher;
///
/// let publisher = MockPublisher::new();
///
/// let receipt = publisher.publish(&artifact, &verdict).await?;
/// assert_eq!(receipt.external_ref, "post-1");
///
/// let published = publisher.published().await;
/// assert_eq!(published.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockPublisher {
    /// Artifacts published so far.
    published: Arc<RwLock<Vec<ContentArtifact>>>,
    /// If set, the next publish will fail with this reason.
    next_error: Arc<RwLock<Option<String>>>,
    /// Serial for generated external refs.
    serial: AtomicU64,
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPublisher {
    /// Create a new mock publisher.
    pub fn new() -> Self {
        Self {
            published: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            serial: AtomicU64::new(0),
        }
    }

    /// Get all published artifacts.
    pub async fn published(&self) -> Vec<ContentArtifact> {
        self.published.read().await.clone()
    }

    /// Get the number of publishes performed.
    pub async fn publish_count(&self) -> usize {
        self.published.read().await.len()
    }

    /// Configure the next publish to fail with the given reason.
    pub async fn set_next_error(&self, reason: impl Into<String>) {
        *self.next_error.write().await = Some(reason.into());
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<String> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        "mock_publisher"
    }

    async fn publish(
        &self,
        artifact: &ContentArtifact,
        _verdict: &JudgeVerdict,
    ) -> Result<PublishReceipt, RouterError> {
        if let Some(reason) = self.take_error().await {
            return Err(RouterError::PublishFailed {
                artifact_id: artifact.artifact_id.clone(),
                reason,
            });
        }

        self.published.write().await.push(artifact.clone());
        let serial = self.serial.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(PublishReceipt {
            artifact_id: artifact.artifact_id.clone(),
            platform: artifact.platform.clone(),
            external_ref: format!("post-{serial}"),
            published_at: Utc::now(),
        })
    }
}
