//! Campaign run orchestration.
//!
//! [`CampaignPipeline`] drives one campaign from brief to report: open the
//! budget ledger, decompose the goal, execute the tasks through the worker
//! pool, judge every artifact, and route each verdict. Low-confidence
//! artifacts come back as rework successors and re-enter the next round
//! until they pass or hit the rework cap.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::audit::{AuditEvent, AuditHandle};
use crate::budget::BudgetGovernor;
use crate::campaign::TaskEnvelope;
use crate::judge::Judge;
use crate::metrics;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::types::{
    CampaignBrief, CampaignReport, PipelineError, TaskDisposition, TaskSummary,
};
use crate::planner::Planner;
use crate::router::{RouteOutcome, Router};
use crate::worker::WorkerPool;

/// Runs campaigns end to end.
///
/// The pipeline owns the retry loop: the router hands rework successors
/// back, and the pipeline decides whether they re-enter the next round or
/// the task is abandoned. Per-task failures never fail the run; they are
/// recorded in the report and the remaining tasks continue.
pub struct CampaignPipeline {
    config: PipelineConfig,
    planner: Arc<dyn Planner>,
    pool: Arc<WorkerPool>,
    judge: Arc<dyn Judge>,
    router: Router,
    budget: Arc<BudgetGovernor>,
    audit: Option<AuditHandle>,
}

impl CampaignPipeline {
    /// Create a new pipeline.
    pub fn new(
        config: PipelineConfig,
        planner: Arc<dyn Planner>,
        pool: Arc<WorkerPool>,
        judge: Arc<dyn Judge>,
        router: Router,
        budget: Arc<BudgetGovernor>,
        audit: Option<AuditHandle>,
    ) -> Self {
        Self {
            config,
            planner,
            pool,
            judge,
            router,
            budget,
            audit,
        }
    }

    /// Run one campaign to completion.
    ///
    /// Fails only when the ledger cannot be opened or the goal cannot be
    /// decomposed. Everything after planning is recorded per task in the
    /// returned [`CampaignReport`].
    pub async fn run(&self, brief: CampaignBrief) -> Result<CampaignReport, PipelineError> {
        let started = Instant::now();
        let campaign_id = brief.campaign_id.clone();

        if let Err(err) = self.budget.open(&campaign_id, brief.budget) {
            metrics::CAMPAIGN_RUNS.with_label_values(&["failed"]).inc();
            return Err(err.into());
        }

        tracing::info!(
            campaign_id = %campaign_id,
            goal = %brief.goal,
            budget = brief.budget,
            "campaign run started"
        );
        if let Some(ref audit) = self.audit {
            audit
                .emit(AuditEvent::CampaignStarted {
                    campaign_id: campaign_id.clone(),
                    goal: brief.goal.clone(),
                    budget: brief.budget,
                })
                .await;
        }

        let mut batch = match self.planner.decompose(&campaign_id, &brief.goal) {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::warn!(
                    campaign_id = %campaign_id,
                    error = %err,
                    "goal decomposition failed"
                );
                metrics::CAMPAIGN_RUNS.with_label_values(&["failed"]).inc();
                if let Some(ref audit) = self.audit {
                    audit
                        .emit(AuditEvent::CampaignFailed {
                            campaign_id: campaign_id.clone(),
                            error: err.to_string(),
                        })
                        .await;
                }
                return Err(err.into());
            }
        };

        if let Some(ref audit) = self.audit {
            audit
                .emit(AuditEvent::TasksPlanned {
                    campaign_id: campaign_id.clone(),
                    task_count: batch.len(),
                    task_types: batch
                        .iter()
                        .map(|task| task.task_type.as_str().to_string())
                        .collect(),
                })
                .await;
        }

        let mut summaries: Vec<TaskSummary> = Vec::new();
        let mut published = Vec::new();
        let mut total_spent = 0.0;
        // Keyed by task id: rework cycles consumed and dollars across attempts.
        let mut rework_counts: HashMap<String, u32> = HashMap::new();
        let mut spent_by_task: HashMap<String, f64> = HashMap::new();

        while !batch.is_empty() {
            let reports = self.pool.execute_batch(batch.clone()).await;
            let mut next_batch = Vec::new();

            for (task, report) in batch.iter().zip(reports) {
                total_spent += report.spent;
                let task_spent = {
                    let entry = spent_by_task.entry(task.task_id.clone()).or_insert(0.0);
                    *entry += report.spent;
                    *entry
                };
                let cycles_used = rework_counts.get(&task.task_id).copied().unwrap_or(0);

                let artifact = match report.result {
                    Ok(artifact) => artifact,
                    Err(err) => {
                        // The pool already logged, metered, and audited this.
                        summaries.push(Self::summarize(
                            task,
                            TaskDisposition::Failed,
                            cycles_used,
                            task_spent,
                            err.to_string(),
                        ));
                        continue;
                    }
                };

                let verdict = self.judge.evaluate(&artifact).await;
                if let Some(ref audit) = self.audit {
                    audit
                        .emit(AuditEvent::VerdictIssued {
                            campaign_id: campaign_id.clone(),
                            task_id: task.task_id.clone(),
                            artifact_id: artifact.artifact_id.clone(),
                            confidence: verdict.confidence.as_str().to_string(),
                            approved: verdict.approved,
                            sensitive_topic: verdict.sensitive_topic,
                            reason: verdict.reason.clone(),
                        })
                        .await;
                }

                match self.router.dispatch(task, &artifact, &verdict).await {
                    Ok(RouteOutcome::Published(receipt)) => {
                        if let Some(ref audit) = self.audit {
                            audit
                                .emit(AuditEvent::ArtifactPublished {
                                    campaign_id: campaign_id.clone(),
                                    task_id: task.task_id.clone(),
                                    artifact_id: receipt.artifact_id.clone(),
                                    platform: receipt.platform.clone(),
                                    external_ref: receipt.external_ref.clone(),
                                })
                                .await;
                        }
                        summaries.push(Self::summarize(
                            task,
                            TaskDisposition::Published,
                            cycles_used,
                            task_spent,
                            receipt.external_ref.clone(),
                        ));
                        published.push(receipt);
                    }
                    Ok(RouteOutcome::QueuedForReview) => {
                        if let Some(ref audit) = self.audit {
                            audit
                                .emit(AuditEvent::ReviewQueued {
                                    campaign_id: campaign_id.clone(),
                                    task_id: task.task_id.clone(),
                                    artifact_id: artifact.artifact_id.clone(),
                                    reason: verdict.reason.clone(),
                                })
                                .await;
                        }
                        summaries.push(Self::summarize(
                            task,
                            TaskDisposition::QueuedForReview,
                            cycles_used,
                            task_spent,
                            verdict.reason.clone(),
                        ));
                    }
                    Ok(RouteOutcome::Requeued { successor }) => {
                        if cycles_used < self.config.max_rework_cycles {
                            rework_counts.insert(task.task_id.clone(), cycles_used + 1);
                            tracing::debug!(
                                task_id = %task.task_id,
                                next_version = successor.version,
                                reason = %verdict.reason,
                                "rework scheduled"
                            );
                            if let Some(ref audit) = self.audit {
                                audit
                                    .emit(AuditEvent::ReworkScheduled {
                                        campaign_id: campaign_id.clone(),
                                        task_id: task.task_id.clone(),
                                        next_version: successor.version,
                                        reason: verdict.reason.clone(),
                                    })
                                    .await;
                            }
                            next_batch.push(successor);
                        } else {
                            tracing::warn!(
                                task_id = %task.task_id,
                                cycles = cycles_used,
                                reason = %verdict.reason,
                                "rework cap reached, abandoning task"
                            );
                            if let Some(ref audit) = self.audit {
                                audit
                                    .emit(AuditEvent::ReworkAbandoned {
                                        campaign_id: campaign_id.clone(),
                                        task_id: task.task_id.clone(),
                                        cycles: cycles_used,
                                        last_reason: verdict.reason.clone(),
                                    })
                                    .await;
                            }
                            summaries.push(Self::summarize(
                                task,
                                TaskDisposition::Abandoned,
                                cycles_used,
                                task_spent,
                                verdict.reason.clone(),
                            ));
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            task_id = %task.task_id,
                            artifact_id = %artifact.artifact_id,
                            error = %err,
                            "routing failed"
                        );
                        summaries.push(Self::summarize(
                            task,
                            TaskDisposition::Failed,
                            cycles_used,
                            task_spent,
                            err.to_string(),
                        ));
                    }
                }
            }

            batch = next_batch;
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        let remaining_budget = self.budget.available(&campaign_id).unwrap_or(0.0);
        let report = CampaignReport {
            campaign_id: campaign_id.clone(),
            goal: brief.goal,
            tasks: summaries,
            published,
            total_spent,
            remaining_budget,
            duration_ms,
        };

        metrics::CAMPAIGN_RUNS
            .with_label_values(&["completed"])
            .inc();
        metrics::CAMPAIGN_DURATION.observe(started.elapsed().as_secs_f64());

        tracing::info!(
            campaign_id = %campaign_id,
            published = report.published_count(),
            queued_for_review = report.review_count(),
            abandoned = report.abandoned_count(),
            failed = report.failed_count(),
            total_spent = report.total_spent,
            duration_ms,
            "campaign run completed"
        );
        if let Some(ref audit) = self.audit {
            audit
                .emit(AuditEvent::CampaignCompleted {
                    campaign_id: campaign_id.clone(),
                    published: report.published_count(),
                    queued_for_review: report.review_count(),
                    abandoned: report.abandoned_count(),
                    failed: report.failed_count(),
                    total_spent: report.total_spent,
                    duration_ms,
                })
                .await;
        }

        Ok(report)
    }

    fn summarize(
        task: &TaskEnvelope,
        disposition: TaskDisposition,
        rework_cycles: u32,
        spent: f64,
        detail: impl Into<String>,
    ) -> TaskSummary {
        TaskSummary {
            task_id: task.task_id.clone(),
            task_type: task.task_type,
            final_version: task.version,
            disposition,
            rework_cycles,
            spent,
            detail: detail.into(),
        }
    }
}
