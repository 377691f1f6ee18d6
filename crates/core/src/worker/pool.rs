//! Concurrent task execution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;

use crate::audit::{AuditEvent, AuditHandle};
use crate::budget::{BudgetError, BudgetGovernor};
use crate::campaign::{ContentArtifact, TaskEnvelope};
use crate::metrics;

use super::config::WorkerConfig;
use super::executors::ExecutorSet;
use super::types::{PoolStatus, TaskError, TaskReport};

/// Tracks counters for the worker pool.
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_completed: AtomicU64,
    total_failed: AtomicU64,
}

impl Default for PoolStats {
    fn default() -> Self {
        Self {
            active: AtomicU64::new(0),
            queued: AtomicU64::new(0),
            total_completed: AtomicU64::new(0),
            total_failed: AtomicU64::new(0),
        }
    }
}

impl PoolStats {
    fn to_status(&self, max_concurrent: usize) -> PoolStatus {
        PoolStatus {
            active_tasks: self.active.load(Ordering::Relaxed) as usize,
            queued_tasks: self.queued.load(Ordering::Relaxed) as usize,
            max_concurrent,
            total_completed: self.total_completed.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Executes task batches against registered executors.
///
/// Every task runs under the same bracket: reserve the executor's estimate
/// from the campaign ledger, invoke the skill under the per-task deadline,
/// then settle. On failure or timeout the full reservation is returned; on
/// success only the actual cost stays debited.
pub struct WorkerPool {
    executors: Arc<ExecutorSet>,
    budget: Arc<BudgetGovernor>,
    config: WorkerConfig,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
    audit: Option<AuditHandle>,
}

impl WorkerPool {
    /// Creates a new worker pool.
    pub fn new(executors: ExecutorSet, budget: Arc<BudgetGovernor>, config: WorkerConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_tasks));
        Self {
            executors: Arc::new(executors),
            budget,
            config,
            semaphore,
            stats: Arc::new(PoolStats::default()),
            audit: None,
        }
    }

    /// Sets the audit handle for emitting task events.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Returns the current pool status.
    pub fn status(&self) -> PoolStatus {
        self.stats.to_status(self.config.max_concurrent_tasks)
    }

    /// Execute a single task to completion.
    pub async fn execute(&self, task: TaskEnvelope) -> TaskReport {
        Self::run_task(
            Arc::clone(&self.executors),
            Arc::clone(&self.budget),
            self.config.clone(),
            Arc::clone(&self.semaphore),
            Arc::clone(&self.stats),
            self.audit.clone(),
            task,
        )
        .await
    }

    /// Execute a batch concurrently, one spawned worker per task.
    ///
    /// Reports come back in input order. A worker that panics yields an
    /// `Aborted` report and forfeits any reservation it held.
    pub async fn execute_batch(&self, tasks: Vec<TaskEnvelope>) -> Vec<TaskReport> {
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let meta = (
                task.task_id.clone(),
                task.campaign_id.clone(),
                task.task_type,
                task.version,
            );
            let handle = tokio::spawn(Self::run_task(
                Arc::clone(&self.executors),
                Arc::clone(&self.budget),
                self.config.clone(),
                Arc::clone(&self.semaphore),
                Arc::clone(&self.stats),
                self.audit.clone(),
                task,
            ));
            handles.push((meta, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for ((task_id, campaign_id, task_type, version), handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                    metrics::TASK_OUTCOMES.with_label_values(&["aborted"]).inc();
                    tracing::error!(task_id = %task_id, error = %e, "task worker aborted");
                    reports.push(TaskReport {
                        task_id,
                        campaign_id,
                        task_type,
                        version,
                        result: Err(TaskError::Aborted(e.to_string())),
                        spent: 0.0,
                        duration_ms: 0,
                    });
                }
            }
        }
        reports
    }

    async fn run_task(
        executors: Arc<ExecutorSet>,
        budget: Arc<BudgetGovernor>,
        config: WorkerConfig,
        semaphore: Arc<Semaphore>,
        stats: Arc<PoolStats>,
        audit: Option<AuditHandle>,
        task: TaskEnvelope,
    ) -> TaskReport {
        stats.queued.fetch_add(1, Ordering::Relaxed);
        let permit = semaphore.acquire_owned().await;
        stats.queued.fetch_sub(1, Ordering::Relaxed);

        let _permit = match permit {
            Ok(permit) => permit,
            Err(_) => {
                stats.total_failed.fetch_add(1, Ordering::Relaxed);
                metrics::TASK_OUTCOMES.with_label_values(&["aborted"]).inc();
                return TaskReport {
                    task_id: task.task_id,
                    campaign_id: task.campaign_id,
                    task_type: task.task_type,
                    version: task.version,
                    result: Err(TaskError::Aborted("worker pool closed".to_string())),
                    spent: 0.0,
                    duration_ms: 0,
                };
            }
        };

        let start = Instant::now();
        stats.active.fetch_add(1, Ordering::Relaxed);
        metrics::TASKS_DISPATCHED
            .with_label_values(&[task.task_type.as_str()])
            .inc();
        tracing::debug!(
            task_id = %task.task_id,
            task_type = %task.task_type,
            version = task.version,
            "task dispatched"
        );
        if let Some(ref audit) = audit {
            audit
                .emit(AuditEvent::TaskDispatched {
                    campaign_id: task.campaign_id.clone(),
                    task_id: task.task_id.clone(),
                    task_type: task.task_type.as_str().to_string(),
                    version: task.version,
                })
                .await;
        }

        let (result, spent) = Self::attempt(&executors, &budget, &config, audit.as_ref(), &task).await;

        stats.active.fetch_sub(1, Ordering::Relaxed);
        let duration = start.elapsed();
        let duration_ms = duration.as_millis() as u64;
        metrics::TASK_DURATION
            .with_label_values(&[task.task_type.as_str()])
            .observe(duration.as_secs_f64());

        match &result {
            Ok(artifact) => {
                stats.total_completed.fetch_add(1, Ordering::Relaxed);
                metrics::TASK_OUTCOMES.with_label_values(&["completed"]).inc();
                if spent > 0.0 {
                    metrics::TASK_SPEND.observe(spent);
                }
                tracing::info!(
                    task_id = %task.task_id,
                    artifact_id = %artifact.artifact_id,
                    spent,
                    "task completed"
                );
                if let Some(ref audit) = audit {
                    audit
                        .emit(AuditEvent::ArtifactProduced {
                            campaign_id: task.campaign_id.clone(),
                            task_id: task.task_id.clone(),
                            artifact_id: artifact.artifact_id.clone(),
                            content_type: artifact.content_type.clone(),
                            platform: artifact.platform.clone(),
                            cost: spent,
                            duration_ms,
                        })
                        .await;
                }
            }
            Err(err) => {
                stats.total_failed.fetch_add(1, Ordering::Relaxed);
                metrics::TASK_OUTCOMES
                    .with_label_values(&[err.outcome_label()])
                    .inc();
                tracing::warn!(task_id = %task.task_id, error = %err, "task failed");
                if let Some(ref audit) = audit {
                    audit
                        .emit(AuditEvent::TaskFailed {
                            campaign_id: task.campaign_id.clone(),
                            task_id: task.task_id.clone(),
                            task_type: task.task_type.as_str().to_string(),
                            error: err.to_string(),
                            duration_ms,
                        })
                        .await;
                }
            }
        }

        TaskReport {
            task_id: task.task_id,
            campaign_id: task.campaign_id,
            task_type: task.task_type,
            version: task.version,
            result,
            spent,
            duration_ms,
        }
    }

    /// Reserve, run under the deadline, settle the ledger.
    async fn attempt(
        executors: &ExecutorSet,
        budget: &BudgetGovernor,
        config: &WorkerConfig,
        audit: Option<&AuditHandle>,
        task: &TaskEnvelope,
    ) -> (Result<ContentArtifact, TaskError>, f64) {
        let executor = match executors.get(task.task_type) {
            Some(executor) => executor,
            None => return (Err(TaskError::Unsupported(task.task_type)), 0.0),
        };

        let estimate = match executor.estimate_cost(task) {
            Ok(estimate) => estimate,
            Err(err) => return (Err(err), 0.0),
        };

        match budget.reserve(&task.campaign_id, estimate) {
            Ok(remaining) => {
                metrics::BUDGET_RESERVATIONS
                    .with_label_values(&["granted"])
                    .inc();
                if estimate > 0.0 {
                    if let Some(audit) = audit {
                        audit
                            .emit(AuditEvent::BudgetReserved {
                                campaign_id: task.campaign_id.clone(),
                                task_id: task.task_id.clone(),
                                amount: estimate,
                                remaining,
                            })
                            .await;
                    }
                }
            }
            Err(err) => {
                metrics::BUDGET_RESERVATIONS
                    .with_label_values(&["denied"])
                    .inc();
                if let BudgetError::Exceeded {
                    requested,
                    available,
                } = &err
                {
                    tracing::warn!(
                        task_id = %task.task_id,
                        requested,
                        available,
                        "budget reservation denied"
                    );
                    if let Some(audit) = audit {
                        audit
                            .emit(AuditEvent::BudgetDenied {
                                campaign_id: task.campaign_id.clone(),
                                task_id: task.task_id.clone(),
                                requested: *requested,
                                available: *available,
                            })
                            .await;
                    }
                }
                return (Err(TaskError::Budget(err)), 0.0);
            }
        }

        let deadline = Duration::from_secs(config.task_deadline_secs);
        match tokio::time::timeout(deadline, executor.execute(task, estimate)).await {
            Ok(Ok(output)) => {
                if output.cost > estimate {
                    tracing::warn!(
                        task_id = %task.task_id,
                        cost = output.cost,
                        reserved = estimate,
                        "skill reported spend past its reservation"
                    );
                }
                let spent = output.cost.min(estimate);
                Self::settle(budget, audit, task, estimate - spent).await;
                (Ok(output.artifact), spent)
            }
            Ok(Err(err)) => {
                Self::settle(budget, audit, task, estimate).await;
                (Err(err), 0.0)
            }
            Err(_) => {
                Self::settle(budget, audit, task, estimate).await;
                (
                    Err(TaskError::DeadlineExceeded {
                        deadline_secs: config.task_deadline_secs,
                    }),
                    0.0,
                )
            }
        }
    }

    /// Return an unused reservation to the campaign ledger.
    async fn settle(
        budget: &BudgetGovernor,
        audit: Option<&AuditHandle>,
        task: &TaskEnvelope,
        refund: f64,
    ) {
        if refund <= 0.0 {
            return;
        }
        match budget.release(&task.campaign_id, refund) {
            Ok(()) => {
                if let Some(audit) = audit {
                    audit
                        .emit(AuditEvent::BudgetReleased {
                            campaign_id: task.campaign_id.clone(),
                            task_id: task.task_id.clone(),
                            amount: refund,
                        })
                        .await;
                }
            }
            Err(err) => {
                tracing::error!(
                    task_id = %task.task_id,
                    error = %err,
                    "failed to return reservation"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{create_audit_system, AuditFilter, AuditStore, MemoryAuditStore};
    use crate::campaign::TaskType;
    use crate::skill::{StaticTrendFetcher, TemplateContentGenerator};
    use crate::worker::executors::TaskExecutor;
    use crate::worker::types::ExecutionOutput;
    use async_trait::async_trait;
    use std::collections::HashSet;

    fn trend_task(campaign: &str) -> TaskEnvelope {
        TaskEnvelope::new(
            campaign,
            TaskType::TrendResearch,
            serde_json::json!({
                "platform": "tiktok",
                "region": "US",
                "limit": 3,
            }),
        )
    }

    fn content_task(campaign: &str) -> TaskEnvelope {
        content_task_with_persona(campaign, "techGuru")
    }

    fn content_task_with_persona(campaign: &str, persona: &str) -> TaskEnvelope {
        TaskEnvelope::new(
            campaign,
            TaskType::ContentGeneration,
            serde_json::json!({
                "topic": "launch summer sale",
                "keywords": ["launch", "summer", "sale"],
                "platform": "tiktok",
                "persona": persona,
                "region": "US",
            }),
        )
    }

    fn pool_with(generator: TemplateContentGenerator, budget: Arc<BudgetGovernor>) -> WorkerPool {
        let executors = ExecutorSet::new()
            .with_trend_fetcher(Arc::new(StaticTrendFetcher::new()))
            .with_content_generator(Arc::new(generator));
        WorkerPool::new(executors, budget, WorkerConfig::default())
    }

    /// Executor with a fixed quote and spend, optionally slow.
    struct FlatExecutor {
        quote: f64,
        cost: f64,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl TaskExecutor for FlatExecutor {
        fn name(&self) -> &str {
            "flat_executor"
        }

        fn task_type(&self) -> TaskType {
            TaskType::Engagement
        }

        fn estimate_cost(&self, _task: &TaskEnvelope) -> Result<f64, TaskError> {
            Ok(self.quote)
        }

        async fn execute(
            &self,
            task: &TaskEnvelope,
            _reserved: f64,
        ) -> Result<ExecutionOutput, TaskError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(ExecutionOutput {
                artifact: ContentArtifact::for_task(
                    task,
                    "engagement_plan",
                    "reply to top comments daily",
                    "tiktok",
                ),
                cost: self.cost,
            })
        }
    }

    #[tokio::test]
    async fn test_batch_reports_preserve_input_order() {
        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 100.0).unwrap();
        let pool = pool_with(TemplateContentGenerator::new(), Arc::clone(&budget));

        let reports = pool
            .execute_batch(vec![trend_task("c-1"), content_task("c-1")])
            .await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].task_type, TaskType::TrendResearch);
        assert_eq!(reports[1].task_type, TaskType::ContentGeneration);
        assert!(reports.iter().all(|r| r.succeeded()));
    }

    #[tokio::test]
    async fn test_two_of_three_tasks_fit_a_ten_dollar_budget() {
        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 10.0).unwrap();
        let pool = pool_with(
            TemplateContentGenerator::with_costs(4.0, 0.0),
            Arc::clone(&budget),
        );

        let reports = pool
            .execute_batch(vec![
                content_task("c-1"),
                content_task("c-1"),
                content_task("c-1"),
            ])
            .await;

        let succeeded = reports.iter().filter(|r| r.succeeded()).count();
        assert_eq!(succeeded, 2, "only two $4 tasks fit in $10");

        let denial = reports
            .iter()
            .find_map(|r| match &r.result {
                Err(TaskError::Budget(BudgetError::Exceeded {
                    requested,
                    available,
                })) => Some((*requested, *available)),
                _ => None,
            })
            .expect("one task should be denied");
        assert_eq!(denial.0, 4.0);
        assert_eq!(denial.1, 2.0);
        assert_eq!(budget.available("c-1"), Some(2.0));
    }

    #[tokio::test]
    async fn test_hundred_concurrent_tasks_produce_distinct_artifacts() {
        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 1000.0).unwrap();
        let pool = pool_with(TemplateContentGenerator::new(), Arc::clone(&budget));

        let tasks: Vec<_> = (0..100).map(|_| content_task("c-1")).collect();
        let reports = pool.execute_batch(tasks).await;

        assert_eq!(reports.len(), 100);
        assert!(reports.iter().all(|r| r.succeeded()));

        let artifact_ids: HashSet<_> = reports
            .iter()
            .filter_map(|r| r.artifact().map(|a| a.artifact_id.clone()))
            .collect();
        assert_eq!(artifact_ids.len(), 100, "every artifact id is distinct");

        // Default cost is 1.25 + 3 * 0.25 per task.
        assert_eq!(budget.available("c-1"), Some(800.0));
    }

    #[tokio::test]
    async fn test_unsupported_task_type_is_rejected() {
        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 10.0).unwrap();
        let pool = pool_with(TemplateContentGenerator::new(), Arc::clone(&budget));

        let task = TaskEnvelope::new("c-1", TaskType::Engagement, serde_json::json!({}));
        let report = pool.execute(task).await;

        assert!(matches!(
            report.result,
            Err(TaskError::Unsupported(TaskType::Engagement))
        ));
        assert_eq!(budget.available("c-1"), Some(10.0));
    }

    #[tokio::test]
    async fn test_skill_failure_returns_the_reservation() {
        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 10.0).unwrap();
        let pool = pool_with(
            TemplateContentGenerator::with_costs(3.0, 0.0),
            Arc::clone(&budget),
        );

        let report = pool
            .execute(content_task_with_persona("c-1", "   "))
            .await;

        match &report.result {
            Err(TaskError::Skill { skill, .. }) => {
                assert_eq!(skill, "template_content_generator");
            }
            other => panic!("expected Skill error, got {other:?}"),
        }
        assert_eq!(report.spent, 0.0);
        assert_eq!(budget.available("c-1"), Some(10.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_the_skill_invocation() {
        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 10.0).unwrap();

        let executors = ExecutorSet::new().with_executor(Arc::new(FlatExecutor {
            quote: 1.0,
            cost: 1.0,
            delay: Some(Duration::from_secs(120)),
        }));
        let pool = WorkerPool::new(executors, Arc::clone(&budget), WorkerConfig::default());

        let task = TaskEnvelope::new("c-1", TaskType::Engagement, serde_json::json!({}));
        let report = pool.execute(task).await;

        assert!(matches!(
            report.result,
            Err(TaskError::DeadlineExceeded { deadline_secs: 30 })
        ));
        // The timed-out reservation goes back to the ledger.
        assert_eq!(budget.available("c-1"), Some(10.0));
    }

    #[tokio::test]
    async fn test_unspent_reservation_is_refunded() {
        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 10.0).unwrap();

        let executors = ExecutorSet::new().with_executor(Arc::new(FlatExecutor {
            quote: 5.0,
            cost: 2.0,
            delay: None,
        }));
        let pool = WorkerPool::new(executors, Arc::clone(&budget), WorkerConfig::default());

        let task = TaskEnvelope::new("c-1", TaskType::Engagement, serde_json::json!({}));
        let report = pool.execute(task).await;

        assert!(report.succeeded());
        assert_eq!(report.spent, 2.0);
        assert_eq!(budget.available("c-1"), Some(8.0));
    }

    #[tokio::test]
    async fn test_status_reflects_totals() {
        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 100.0).unwrap();
        let pool = pool_with(TemplateContentGenerator::new(), Arc::clone(&budget));

        let engagement = TaskEnvelope::new("c-1", TaskType::Engagement, serde_json::json!({}));
        pool.execute_batch(vec![trend_task("c-1"), content_task("c-1"), engagement])
            .await;

        let status = pool.status();
        assert_eq!(status.active_tasks, 0);
        assert_eq!(status.queued_tasks, 0);
        assert_eq!(status.total_completed, 2);
        assert_eq!(status.total_failed, 1);
        assert_eq!(status.max_concurrent, 8);
    }

    #[tokio::test]
    async fn test_task_events_are_emitted() {
        let store = Arc::new(MemoryAuditStore::new());
        let (handle, writer) = create_audit_system(Arc::clone(&store) as Arc<dyn AuditStore>, 64);
        let writer_task = tokio::spawn(writer.run());

        let budget = Arc::new(BudgetGovernor::new());
        budget.open("c-1", 10.0).unwrap();
        let pool = pool_with(TemplateContentGenerator::new(), Arc::clone(&budget))
            .with_audit(handle.clone());

        pool.execute(content_task("c-1")).await;

        drop(pool);
        drop(handle);
        writer_task.await.unwrap();

        for event_type in ["task_dispatched", "budget_reserved", "artifact_produced"] {
            let count = store
                .count(&AuditFilter::new().with_event_type(event_type))
                .unwrap();
            assert_eq!(count, 1, "expected one {event_type} event");
        }
    }
}
