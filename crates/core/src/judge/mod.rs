//! Artifact validation and confidence tiering.
//!
//! The judge is the gate between execution and routing. Evaluation order:
//! version guard first (stale work is rejected before any content check),
//! then safety and persona rules, then tier assignment. A verdict is an
//! append-only record; the artifact itself is never touched.

use std::sync::Arc;

use async_trait::async_trait;

use crate::audit::{AuditEvent, AuditHandle};
use crate::campaign::{ConfidenceLevel, ContentArtifact, JudgeVerdict};
use crate::metrics;
use crate::version::VersionGuard;

mod config;
mod rules;

pub use config::JudgeConfig;
pub use rules::{RuleEngine, RuleReport};

/// Trait for artifact judges.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Evaluate one artifact and issue a verdict.
    ///
    /// The same artifact version is judged at most once: the version guard
    /// advances on the first evaluation, so a second submission of the same
    /// version comes back stale.
    async fn evaluate(&self, artifact: &ContentArtifact) -> JudgeVerdict;
}

/// Rule-based judge.
///
/// Tiering: low when a sensitive topic or hard violation is found, high when
/// everything passes, medium when only advisories are open.
pub struct RuleJudge {
    guard: Arc<VersionGuard>,
    engine: RuleEngine,
    audit: Option<AuditHandle>,
}

impl RuleJudge {
    /// Create a judge with the default rule set.
    pub fn new(guard: Arc<VersionGuard>) -> Self {
        Self::with_config(guard, JudgeConfig::default())
    }

    /// Create a judge with a custom rule set.
    pub fn with_config(guard: Arc<VersionGuard>, config: JudgeConfig) -> Self {
        Self {
            guard,
            engine: RuleEngine::new(config),
            audit: None,
        }
    }

    /// Sets the audit handle for emitting stale rejection events.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }
}

#[async_trait]
impl Judge for RuleJudge {
    async fn evaluate(&self, artifact: &ContentArtifact) -> JudgeVerdict {
        if let Err(stale) = self
            .guard
            .check_and_advance(&artifact.task_id, artifact.version)
        {
            tracing::warn!(
                task_id = %artifact.task_id,
                artifact_id = %artifact.artifact_id,
                expected = stale.expected,
                actual = stale.actual,
                "rejecting stale submission"
            );
            metrics::STALE_SUBMISSIONS.inc();
            metrics::VERDICTS
                .with_label_values(&[ConfidenceLevel::Low.as_str()])
                .inc();
            if let Some(ref audit) = self.audit {
                audit
                    .emit(AuditEvent::StaleSubmissionRejected {
                        campaign_id: artifact.campaign_id.clone(),
                        task_id: artifact.task_id.clone(),
                        expected_version: stale.expected,
                        submitted_version: stale.actual,
                    })
                    .await;
            }
            return JudgeVerdict::new(
                &artifact.artifact_id,
                ConfidenceLevel::Low,
                false,
                stale.to_string(),
            );
        }

        let report = self.engine.apply(artifact);
        let confidence = if report.sensitive() || !report.violations.is_empty() {
            ConfidenceLevel::Low
        } else if !report.advisories.is_empty() {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        };

        tracing::debug!(
            artifact_id = %artifact.artifact_id,
            confidence = %confidence,
            sensitive = report.sensitive(),
            "verdict issued"
        );
        metrics::VERDICTS
            .with_label_values(&[confidence.as_str()])
            .inc();

        JudgeVerdict::new(
            &artifact.artifact_id,
            confidence,
            report.sensitive(),
            report.reason(),
        )
    }
}
