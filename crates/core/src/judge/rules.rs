//! Safety and persona rule checks over artifact content.

use regex_lite::Regex;

use crate::campaign::ContentArtifact;
use crate::judge::config::JudgeConfig;

/// Outcome of running the rule set against one artifact.
#[derive(Debug, Clone, Default)]
pub struct RuleReport {
    /// Sensitive topics found in the body.
    pub sensitive_matches: Vec<String>,
    /// Hard rule violations, each forces a low tier.
    pub violations: Vec<String>,
    /// Advisory findings, each caps the tier at medium.
    pub advisories: Vec<String>,
}

impl RuleReport {
    /// Whether any sensitive topic was found.
    pub fn sensitive(&self) -> bool {
        !self.sensitive_matches.is_empty()
    }

    /// Whether every check passed with nothing to report.
    pub fn clean(&self) -> bool {
        self.sensitive_matches.is_empty()
            && self.violations.is_empty()
            && self.advisories.is_empty()
    }

    /// Assemble the verdict reason text.
    pub fn reason(&self) -> String {
        if self.clean() {
            return "all checks passed".to_string();
        }
        let mut parts = Vec::new();
        for topic in &self.sensitive_matches {
            parts.push(format!("sensitive topic: {topic}"));
        }
        parts.extend(self.violations.iter().cloned());
        parts.extend(self.advisories.iter().cloned());
        parts.join("; ")
    }
}

/// Applies the configured rule set to artifacts.
pub struct RuleEngine {
    config: JudgeConfig,
    hashtag_re: Option<Regex>,
}

impl RuleEngine {
    pub fn new(config: JudgeConfig) -> Self {
        let hashtag_re = Regex::new(r"#[0-9a-zA-Z_]+").ok();
        Self { config, hashtag_re }
    }

    /// Run every check against the artifact body.
    pub fn apply(&self, artifact: &ContentArtifact) -> RuleReport {
        let mut report = RuleReport::default();
        let body = artifact.content_body.as_str();
        let body_lower = body.to_lowercase();

        for topic in &self.config.sensitive_topics {
            if body_lower.contains(&topic.to_lowercase()) {
                report.sensitive_matches.push(topic.clone());
            }
        }

        if body.trim().is_empty() {
            report.violations.push("content body is empty".to_string());
        }
        for phrase in &self.config.banned_phrases {
            if body_lower.contains(&phrase.to_lowercase()) {
                report.violations.push(format!("banned phrase: {phrase}"));
            }
        }

        if body.len() < self.config.min_body_len {
            report.advisories.push(format!(
                "body shorter than {} characters",
                self.config.min_body_len
            ));
        }

        if self.is_social(&artifact.content_type) {
            let hashtags = self.distinct_hashtags(body);
            if hashtags < self.config.min_hashtags {
                report.advisories.push(format!(
                    "fewer than {} hashtags",
                    self.config.min_hashtags
                ));
            }
            if let Some(tag) = &self.config.required_disclosure {
                if !body_lower.contains(&tag.to_lowercase()) {
                    report
                        .advisories
                        .push(format!("missing disclosure tag {tag}"));
                }
            }
        }

        report
    }

    fn is_social(&self, content_type: &str) -> bool {
        self.config
            .social_content_types
            .iter()
            .any(|t| t == content_type)
    }

    fn distinct_hashtags(&self, body: &str) -> usize {
        match &self.hashtag_re {
            Some(re) => {
                let mut seen = std::collections::HashSet::new();
                for found in re.find_iter(body) {
                    seen.insert(found.as_str().to_lowercase());
                }
                seen.len()
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::{TaskEnvelope, TaskType};

    fn artifact(content_type: &str, body: &str) -> ContentArtifact {
        let task = TaskEnvelope::new("c-1", TaskType::ContentGeneration, serde_json::json!({}));
        ContentArtifact::for_task(&task, content_type, body, "tiktok")
    }

    fn engine() -> RuleEngine {
        RuleEngine::new(JudgeConfig::default())
    }

    #[test]
    fn test_clean_social_content_passes_all_checks() {
        let report = engine().apply(&artifact(
            "short_video_script",
            "A script about ai tools for makers, with reach. #ai #tools #automation",
        ));
        assert!(report.clean());
        assert_eq!(report.reason(), "all checks passed");
    }

    #[test]
    fn test_sensitive_topic_is_flagged() {
        let report = engine().apply(&artifact(
            "short_video_script",
            "Hot take on the election results this week. #news #votes #counts",
        ));
        assert!(report.sensitive());
        assert_eq!(report.sensitive_matches, vec!["election"]);
        assert!(report.reason().contains("sensitive topic: election"));
    }

    #[test]
    fn test_sensitive_matching_is_case_insensitive() {
        let report = engine().apply(&artifact(
            "short_video_script",
            "GAMBLING strategies that actually work. #luck #cards #table",
        ));
        assert!(report.sensitive());
    }

    #[test]
    fn test_banned_phrase_is_a_violation() {
        let report = engine().apply(&artifact(
            "short_video_script",
            "Guaranteed results in a week, no effort needed. #gains #fast #easy",
        ));
        assert!(!report.sensitive());
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].contains("guaranteed results"));
    }

    #[test]
    fn test_empty_body_is_a_violation() {
        let report = engine().apply(&artifact("short_video_script", "   "));
        assert!(report
            .violations
            .iter()
            .any(|v| v.contains("content body is empty")));
    }

    #[test]
    fn test_short_body_is_an_advisory() {
        let report = engine().apply(&artifact("trend_report", "too short"));
        assert!(report.violations.is_empty());
        assert_eq!(report.advisories.len(), 1);
        assert!(report.advisories[0].contains("shorter than 40"));
    }

    #[test]
    fn test_few_hashtags_is_an_advisory_for_social_content() {
        let report = engine().apply(&artifact(
            "short_video_script",
            "A long enough script body that only carries one tag. #ai",
        ));
        assert_eq!(report.advisories.len(), 1);
        assert!(report.advisories[0].contains("fewer than 3 hashtags"));
    }

    #[test]
    fn test_hashtag_rule_skipped_for_non_social_content() {
        let report = engine().apply(&artifact(
            "trend_report",
            r#"[{"topic":"AI Tools","relevance_score":0.95,"keywords":["ai","tools"]}]"#,
        ));
        assert!(report.clean());
    }

    #[test]
    fn test_repeated_hashtags_count_once() {
        let report = engine().apply(&artifact(
            "short_video_script",
            "Body long enough to pass the length advisory. #ai #ai #AI",
        ));
        // Three occurrences of one tag still miss the minimum.
        assert!(report
            .advisories
            .iter()
            .any(|a| a.contains("fewer than 3 hashtags")));
    }

    #[test]
    fn test_required_disclosure_is_checked_on_social_content() {
        let config = JudgeConfig {
            required_disclosure: Some("#ad".to_string()),
            ..Default::default()
        };
        let engine = RuleEngine::new(config);

        let missing = engine.apply(&artifact(
            "short_video_script",
            "A sponsored segment without the tag. #one #two #three",
        ));
        assert!(missing
            .advisories
            .iter()
            .any(|a| a.contains("missing disclosure tag #ad")));

        let present = engine.apply(&artifact(
            "short_video_script",
            "A sponsored segment with the tag. #one #two #three #ad",
        ));
        assert!(present.clean());
    }
}
