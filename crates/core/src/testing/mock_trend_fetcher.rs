//! Mock trend fetcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::campaign::TaskType;
use crate::skill::{SkillError, TrendData, TrendFetcherSkill};

/// A recorded trend fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    /// Platform that was queried.
    pub platform: String,
    /// Region that was queried.
    pub region: String,
    /// Requested result cap.
    pub limit: usize,
}

/// Mock implementation of the [`TrendFetcherSkill`] trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable trends
/// - Track fetches for assertions
/// - Simulate failures and unavailability
///
/// # Example
///
/// ```rust,ignore
/// use showrunner_core::testing::{fixtures, MockTrendFetcher};
///
/// let fetcher = MockTrendFetcher::with_trends(vec![fixtures::trend("AI Tools")]);
///
/// let trends = fetcher.fetch_trends("tiktok", "US", 5).await?;
/// assert_eq!(trends.len(), 1);
///
/// let fetches = fetcher.recorded_fetches().await;
/// assert_eq!(fetches[0].platform, "tiktok");
/// ```
#[derive(Debug)]
pub struct MockTrendFetcher {
    /// Configured trends to return.
    trends: Arc<RwLock<Vec<TrendData>>>,
    /// Recorded fetches.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<SkillError>>>,
    /// Whether the backend reports itself reachable.
    available: Arc<RwLock<bool>>,
}

impl Default for MockTrendFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTrendFetcher {
    /// Create a new mock fetcher with no trends configured.
    pub fn new() -> Self {
        Self::with_trends(Vec::new())
    }

    /// Create a mock fetcher with predefined trends.
    pub fn with_trends(trends: Vec<TrendData>) -> Self {
        Self {
            trends: Arc::new(RwLock::new(trends)),
            fetches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            available: Arc::new(RwLock::new(true)),
        }
    }

    /// Replace the trends returned by subsequent fetches.
    pub async fn set_trends(&self, trends: Vec<TrendData>) {
        *self.trends.write().await = trends;
    }

    /// Add a single trend.
    pub async fn add_trend(&self, trend: TrendData) {
        self.trends.write().await.push(trend);
    }

    /// Get recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// Configure the next fetch to fail with the given error.
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
impl TrendFetcherSkill for MockTrendFetcher {
    fn name(&self) -> &str {
        "mock_trend_fetcher"
    }

    async fn is_available(&self) -> bool {
        *self.available.read().await
    }

    fn supports(&self, task_type: TaskType) -> bool {
        task_type == TaskType::TrendResearch
    }

    async fn fetch_trends(
        &self,
        platform: &str,
        region: &str,
        limit: usize,
    ) -> Result<Vec<TrendData>, SkillError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.fetches.write().await.push(RecordedFetch {
            platform: platform.to_string(),
            region: region.to_string(),
            limit,
        });

        let trends = self.trends.read().await;
        Ok(trends.iter().take(limit).cloned().collect())
    }
}
