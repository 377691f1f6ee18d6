//! Judge configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the rule-based judge.
///
/// Hard rules (sensitive topics, banned phrases, empty body) force a low
/// confidence tier. Advisory rules (length, hashtags, disclosure) cap the
/// tier at medium so a human reviews the artifact before it is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Topics that flag content as sensitive. Matched case-insensitively
    /// against the content body.
    #[serde(default = "default_sensitive_topics")]
    pub sensitive_topics: Vec<String>,

    /// Phrases that are never allowed in content.
    #[serde(default = "default_banned_phrases")]
    pub banned_phrases: Vec<String>,

    /// Bodies shorter than this many characters get an advisory.
    #[serde(default = "default_min_body_len")]
    pub min_body_len: usize,

    /// Social content should carry at least this many distinct hashtags.
    #[serde(default = "default_min_hashtags")]
    pub min_hashtags: usize,

    /// Content types the hashtag and disclosure rules apply to.
    #[serde(default = "default_social_content_types")]
    pub social_content_types: Vec<String>,

    /// Disclosure tag social content must carry, e.g. "#ad".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_disclosure: Option<String>,
}

fn default_sensitive_topics() -> Vec<String> {
    [
        "politics",
        "election",
        "gambling",
        "casino",
        "crypto giveaway",
        "medical advice",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_banned_phrases() -> Vec<String> {
    [
        "guaranteed results",
        "get rich quick",
        "miracle cure",
        "risk free",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_min_body_len() -> usize {
    40
}

fn default_min_hashtags() -> usize {
    3
}

fn default_social_content_types() -> Vec<String> {
    vec!["short_video_script".to_string(), "social_post".to_string()]
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            sensitive_topics: default_sensitive_topics(),
            banned_phrases: default_banned_phrases(),
            min_body_len: default_min_body_len(),
            min_hashtags: default_min_hashtags(),
            social_content_types: default_social_content_types(),
            required_disclosure: None,
        }
    }
}
