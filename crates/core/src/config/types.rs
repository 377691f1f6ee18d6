use serde::{Deserialize, Serialize};

use crate::judge::JudgeConfig;
use crate::pipeline::PipelineConfig;
use crate::planner::PlannerConfig;
use crate::skill::TemplateContentGenerator;
use crate::worker::WorkerConfig;

/// Root configuration
///
/// Every section is optional; an empty file yields the same configuration
/// the components default to when constructed directly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub skills: SkillConfig,
}

/// Cost model for the bundled simulated skills
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SkillConfig {
    /// Base cost per generated content piece
    #[serde(default = "default_content_base_cost")]
    pub content_base_cost: f64,

    /// Added cost per trend keyword worked into the content
    #[serde(default = "default_content_keyword_rate")]
    pub content_keyword_rate: f64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            content_base_cost: default_content_base_cost(),
            content_keyword_rate: default_content_keyword_rate(),
        }
    }
}

fn default_content_base_cost() -> f64 {
    1.25
}

fn default_content_keyword_rate() -> f64 {
    0.25
}

impl SkillConfig {
    /// Build the bundled content generator priced by this section.
    pub fn content_generator(&self) -> TemplateContentGenerator {
        TemplateContentGenerator::with_costs(self.content_base_cost, self.content_keyword_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{ContentGeneratorSkill, TrendData};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.pipeline.max_rework_cycles, 2);
        assert_eq!(config.planner.platforms, vec!["tiktok", "instagram"]);
        assert_eq!(config.worker.max_concurrent_tasks, 8);
        assert_eq!(config.judge.min_hashtags, 3);
        assert_eq!(config.skills.content_base_cost, 1.25);
    }

    #[test]
    fn test_sections_override_independently() {
        let toml = r#"
[worker]
max_concurrent_tasks = 32

[judge]
min_hashtags = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.worker.max_concurrent_tasks, 32);
        assert_eq!(config.worker.task_deadline_secs, 30);
        assert_eq!(config.judge.min_hashtags, 1);
        assert_eq!(config.planner.persona, "techGuru");
    }

    #[test]
    fn test_full_config_round_trip() {
        let toml = r#"
[pipeline]
max_rework_cycles = 1

[planner]
platforms = ["youtube_shorts"]
persona = "fitCoach"

[skills]
content_base_cost = 2.0
content_keyword_rate = 0.5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.pipeline.max_rework_cycles, 1);
        assert_eq!(config.planner.platforms, vec!["youtube_shorts"]);
        assert_eq!(config.skills.content_keyword_rate, 0.5);

        let serialized = toml::to_string(&config).unwrap();
        let reparsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(reparsed.planner.persona, "fitCoach");
        assert_eq!(reparsed.skills.content_base_cost, 2.0);
    }

    #[test]
    fn test_skill_section_prices_the_generator() {
        let config = SkillConfig {
            content_base_cost: 2.0,
            content_keyword_rate: 0.5,
        };
        let generator = config.content_generator();
        let trend = TrendData::new(
            "trend-1",
            "tiktok",
            "AI Tools",
            vec!["ai".to_string(), "tools".to_string()],
            0.9,
            "US",
        )
        .unwrap();
        assert_eq!(generator.estimate_cost(&trend), 3.0);
    }
}
