//! Core campaign data types shared across the pipeline stages.

mod types;

pub use types::{ConfidenceLevel, ContentArtifact, JudgeVerdict, TaskEnvelope, TaskType};
