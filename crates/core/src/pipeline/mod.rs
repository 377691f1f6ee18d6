//! Campaign pipeline: plan, execute, judge, route, repeat.
//!
//! The pipeline composes the other modules into one campaign run. See
//! [`CampaignPipeline`] for the orchestration and [`CampaignReport`] for
//! what a run produces.

mod config;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use runner::CampaignPipeline;
pub use types::{CampaignBrief, CampaignReport, PipelineError, TaskDisposition, TaskSummary};
