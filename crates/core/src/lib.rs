//! Campaign content pipeline: goal decomposition, budget-governed task
//! execution through pluggable skills, rule-based judging behind a version
//! guard, and confidence-based routing to publish, review, or rework.
//!
//! [`pipeline::CampaignPipeline`] is the front door; the other modules are
//! usable on their own when a host only needs one stage.

pub mod audit;
pub mod budget;
pub mod campaign;
pub mod config;
pub mod judge;
pub mod metrics;
pub mod pipeline;
pub mod planner;
pub mod router;
pub mod skill;
pub mod testing;
pub mod version;
pub mod worker;

pub use audit::{
    create_audit_system, AuditEvent, AuditFilter, AuditHandle, AuditRecord, AuditStore,
    AuditWriter, MemoryAuditStore,
};
pub use budget::{BudgetError, BudgetGovernor};
pub use campaign::{ConfidenceLevel, ContentArtifact, JudgeVerdict, TaskEnvelope, TaskType};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SkillConfig,
};
pub use judge::{Judge, JudgeConfig, RuleJudge};
pub use metrics::register_metrics;
pub use pipeline::{
    CampaignBrief, CampaignPipeline, CampaignReport, PipelineConfig, PipelineError,
    TaskDisposition, TaskSummary,
};
pub use planner::{GoalPlanner, PlanError, Planner, PlannerConfig};
pub use router::{
    route, PublishReceipt, Publisher, ReviewQueue, RouteDecision, RouteOutcome, Router,
    RouterError,
};
pub use skill::{
    ContentGeneratorSkill, ContentPayload, SkillError, StaticTrendFetcher,
    TemplateContentGenerator, TrendData, TrendFetcherSkill,
};
pub use version::{StaleVersionError, VersionGuard};
pub use worker::{
    ContentGenerationExecutor, ExecutionOutput, ExecutorSet, PoolStatus, TaskError, TaskExecutor,
    TaskReport, TrendResearchExecutor, WorkerConfig, WorkerPool,
};
