use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, validate::validate_config, ConfigError};

/// Load configuration from file with environment variable overrides
///
/// Environment variables use the `SHOWRUNNER_` prefix with a double
/// underscore between section and field, e.g.
/// `SHOWRUNNER_WORKER__MAX_CONCURRENT_TASKS=32`. The result is validated
/// before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("SHOWRUNNER_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    validate_config(&config)?;
    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let config: Config =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[worker]
max_concurrent_tasks = 32

[planner]
persona = "fitCoach"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.worker.max_concurrent_tasks, 32);
        assert_eq!(config.planner.persona, "fitCoach");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.worker.max_concurrent_tasks, 8);
        assert_eq!(config.pipeline.max_rework_cycles, 2);
    }

    #[test]
    fn test_load_config_from_str_rejects_bad_toml() {
        let result = load_config_from_str("planner = not toml");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_from_str_rejects_invalid_values() {
        let toml = r#"
[worker]
max_concurrent_tasks = 0
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[planner]
platforms = ["youtube_shorts"]

[judge]
min_hashtags = 1
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.planner.platforms, vec!["youtube_shorts"]);
        assert_eq!(config.judge.min_hashtags, 1);
    }
}
