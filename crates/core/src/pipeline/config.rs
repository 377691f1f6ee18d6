//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the campaign pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rework cycles a task gets after its first rejection. Past the cap the
    /// task is abandoned.
    #[serde(default = "default_max_rework_cycles")]
    pub max_rework_cycles: u32,

    /// Channel capacity for the audit system serving a pipeline run.
    #[serde(default = "default_audit_buffer_size")]
    pub audit_buffer_size: usize,
}

fn default_max_rework_cycles() -> u32 {
    2
}

fn default_audit_buffer_size() -> usize {
    256
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_rework_cycles: default_max_rework_cycles(),
            audit_buffer_size: default_audit_buffer_size(),
        }
    }
}
