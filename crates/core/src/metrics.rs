//! Prometheus metrics for the pipeline components.
//!
//! This module provides metrics for:
//! - Worker pool (dispatches, outcomes, durations, spend)
//! - Judge (verdicts, stale submissions)
//! - Router (decisions, rework cycles)
//! - Budget governor (reservations)
//! - Campaign runs

use once_cell::sync::Lazy;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

// =============================================================================
// Worker Pool Metrics
// =============================================================================

/// Tasks dispatched to the pool by task type.
pub static TASKS_DISPATCHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "showrunner_tasks_dispatched_total",
            "Total tasks dispatched to the worker pool",
        ),
        &["task_type"],
    )
    .unwrap()
});

/// Task outcomes by result.
pub static TASK_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showrunner_task_outcomes_total", "Total task outcomes"),
        &["result"], // "completed", "budget_denied", "skill_failed", "payload", "deadline", "unsupported", "aborted"
    )
    .unwrap()
});

/// Task execution duration in seconds.
pub static TASK_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "showrunner_task_duration_seconds",
            "Duration of task execution",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["task_type"],
    )
    .unwrap()
});

/// Spend recorded per completed task in dollars.
pub static TASK_SPEND: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "showrunner_task_spend_dollars",
            "Spend recorded per completed task",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0]),
    )
    .unwrap()
});

// =============================================================================
// Judge Metrics
// =============================================================================

/// Verdicts issued by confidence tier.
pub static VERDICTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showrunner_verdicts_total", "Total verdicts issued"),
        &["confidence"], // "high", "medium", "low"
    )
    .unwrap()
});

/// Submissions rejected by the version guard.
pub static STALE_SUBMISSIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "showrunner_stale_submissions_total",
        "Total submissions rejected as stale by the version guard",
    )
    .unwrap()
});

// =============================================================================
// Router Metrics
// =============================================================================

/// Routing decisions by kind.
pub static ROUTES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showrunner_routes_total", "Total routing decisions"),
        &["decision"], // "publish", "review", "rework"
    )
    .unwrap()
});

/// Rework cycles scheduled.
pub static REWORK_CYCLES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "showrunner_rework_cycles_total",
        "Total rework cycles scheduled",
    )
    .unwrap()
});

// =============================================================================
// Budget Metrics
// =============================================================================

/// Budget reservations by result.
pub static BUDGET_RESERVATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "showrunner_budget_reservations_total",
            "Total budget reservation attempts",
        ),
        &["result"], // "granted", "denied"
    )
    .unwrap()
});

// =============================================================================
// Campaign Metrics
// =============================================================================

/// Campaign runs by result.
pub static CAMPAIGN_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showrunner_campaign_runs_total", "Total campaign runs"),
        &["result"], // "completed", "failed"
    )
    .unwrap()
});

/// Campaign run duration in seconds.
pub static CAMPAIGN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "showrunner_campaign_duration_seconds",
            "Duration of a full campaign run",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Worker pool
        Box::new(TASKS_DISPATCHED.clone()),
        Box::new(TASK_OUTCOMES.clone()),
        Box::new(TASK_DURATION.clone()),
        Box::new(TASK_SPEND.clone()),
        // Judge
        Box::new(VERDICTS.clone()),
        Box::new(STALE_SUBMISSIONS.clone()),
        // Router
        Box::new(ROUTES.clone()),
        Box::new(REWORK_CYCLES.clone()),
        // Budget
        Box::new(BUDGET_RESERVATIONS.clone()),
        // Campaigns
        Box::new(CAMPAIGN_RUNS.clone()),
        Box::new(CAMPAIGN_DURATION.clone()),
    ]
}

/// Register all core metrics in the given registry.
///
/// The statics are not attached to the default registry; the host application
/// decides where they are exposed.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}
