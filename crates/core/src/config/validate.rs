use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Planner has at least one platform and a non-zero trend limit
/// - Worker concurrency and deadline are non-zero
/// - Audit buffer can actually hold an event
/// - Skill costs are non-negative finite numbers
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.planner.platforms.is_empty() {
        return Err(ConfigError::ValidationError(
            "planner.platforms cannot be empty".to_string(),
        ));
    }
    if config.planner.trend_limit == 0 {
        return Err(ConfigError::ValidationError(
            "planner.trend_limit cannot be 0".to_string(),
        ));
    }

    if config.worker.max_concurrent_tasks == 0 {
        return Err(ConfigError::ValidationError(
            "worker.max_concurrent_tasks cannot be 0".to_string(),
        ));
    }
    if config.worker.task_deadline_secs == 0 {
        return Err(ConfigError::ValidationError(
            "worker.task_deadline_secs cannot be 0".to_string(),
        ));
    }

    // mpsc channels require capacity >= 1.
    if config.pipeline.audit_buffer_size == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.audit_buffer_size cannot be 0".to_string(),
        ));
    }

    for (field, value) in [
        ("skills.content_base_cost", config.skills.content_base_cost),
        (
            "skills.content_keyword_rate",
            config.skills.content_keyword_rate,
        ),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be a non-negative number, got {value}"
            )));
        }
    }

    Ok(())
}
