//! Skill abstraction for externally provided capabilities.
//!
//! Skills are the pluggable collaborators the worker pool invokes: trend
//! fetching and content generation. The traits here define the contract;
//! [`StaticTrendFetcher`] and [`TemplateContentGenerator`] are self-contained
//! implementations useful for local runs and as a fallback when no real
//! backend is wired.

mod simulated;
mod types;

pub use simulated::{StaticTrendFetcher, TemplateContentGenerator};
pub use types::{ContentGeneratorSkill, ContentPayload, SkillError, TrendData, TrendFetcherSkill};
