//! Self-contained skill implementations.
//!
//! No network, no LLM: the trend fetcher serves a fixed catalogue and the
//! content generator fills templates. Useful for local runs, demos, and as a
//! composition-time fallback when no real backend is configured.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::campaign::TaskType;
use crate::skill::types::{
    ContentGeneratorSkill, ContentPayload, SkillError, TrendData, TrendFetcherSkill,
};

/// Fixed trend catalogue: topic plus its keywords.
const TREND_CATALOGUE: [(&str, [&str; 3]); 5] = [
    ("AI Tools", ["ai", "tools", "automation"]),
    ("Short Form Video", ["shorts", "reels", "video"]),
    ("Fitness Challenge", ["fitness", "health", "challenge"]),
    ("DIY Crafts", ["diy", "crafts", "handmade"]),
    ("Tech Reviews", ["tech", "reviews", "gadgets"]),
];

/// Trend fetcher backed by a fixed catalogue.
///
/// Trend ids are derived from platform, region, and a fetch serial, so
/// different regions see different ids and consecutive fetches return
/// evolving data. Relevance decreases down the catalogue: 0.95, 0.85, ...
#[derive(Debug, Default)]
pub struct StaticTrendFetcher {
    fetch_serial: AtomicU64,
}

impl StaticTrendFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrendFetcherSkill for StaticTrendFetcher {
    fn name(&self) -> &str {
        "static_trend_fetcher"
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn supports(&self, task_type: TaskType) -> bool {
        task_type == TaskType::TrendResearch
    }

    async fn fetch_trends(
        &self,
        platform: &str,
        region: &str,
        limit: usize,
    ) -> Result<Vec<TrendData>, SkillError> {
        if platform.trim().is_empty() {
            return Err(SkillError::InvalidInput("platform is blank".to_string()));
        }
        if region.trim().is_empty() {
            return Err(SkillError::InvalidInput("region is blank".to_string()));
        }

        let serial = self.fetch_serial.fetch_add(1, Ordering::SeqCst);
        let mut trends = Vec::new();
        for (idx, (topic, keywords)) in TREND_CATALOGUE.iter().take(limit).enumerate() {
            let relevance = round2(0.95 - 0.1 * idx as f64);
            let trend = TrendData::new(
                format!("trend-{platform}-{region}-{serial}-{idx}"),
                platform,
                *topic,
                keywords.iter().map(|k| k.to_string()).collect(),
                relevance,
                region,
            )?;
            trends.push(trend);
        }
        Ok(trends)
    }
}

/// Content generator that fills deterministic templates.
///
/// Cost model: a base cost plus a per-keyword rate, rounded to cents. The
/// computed cost is checked against the budget the worker granted before any
/// content is assembled.
#[derive(Debug, Clone)]
pub struct TemplateContentGenerator {
    /// Flat cost charged per generation.
    base_cost: f64,
    /// Added cost per trend keyword used.
    keyword_rate: f64,
}

impl Default for TemplateContentGenerator {
    fn default() -> Self {
        Self {
            base_cost: 1.25,
            keyword_rate: 0.25,
        }
    }
}

impl TemplateContentGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the cost model.
    pub fn with_costs(base_cost: f64, keyword_rate: f64) -> Self {
        Self {
            base_cost,
            keyword_rate,
        }
    }

    fn cost_for(&self, trend: &TrendData) -> f64 {
        round2(self.base_cost + self.keyword_rate * trend.keywords.len() as f64)
    }
}

#[async_trait]
impl ContentGeneratorSkill for TemplateContentGenerator {
    fn name(&self) -> &str {
        "template_content_generator"
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn supports(&self, task_type: TaskType) -> bool {
        task_type == TaskType::ContentGeneration
    }

    fn estimate_cost(&self, trend: &TrendData) -> f64 {
        self.cost_for(trend)
    }

    async fn generate(
        &self,
        trend: &TrendData,
        persona: &str,
        budget: f64,
    ) -> Result<ContentPayload, SkillError> {
        if persona.trim().is_empty() {
            return Err(SkillError::InvalidInput("persona is blank".to_string()));
        }
        if trend.topic.trim().is_empty() {
            return Err(SkillError::InvalidInput("trend topic is blank".to_string()));
        }
        if !budget.is_finite() {
            return Err(SkillError::InvalidInput(format!(
                "budget must be a finite number, got {budget}"
            )));
        }

        let cost = self.cost_for(trend);
        if cost > budget {
            return Err(SkillError::BudgetExceeded {
                requested: cost,
                available: budget,
            });
        }

        let keywords = trend.keywords.join(", ");
        let script = format!(
            "Open on a hook: {topic} is everywhere on {platform} right now. \
             As {persona}, walk through what makes it work, name-checking {keywords}. \
             Close with a call to action to follow for the next one.",
            topic = trend.topic,
            platform = trend.platform,
            persona = persona,
            keywords = keywords,
        );
        let caption = format!("{} explained, the {} way.", trend.topic, persona);

        let mut hashtags = vec![hashtag(&trend.topic)];
        hashtags.extend(trend.keywords.iter().map(|k| hashtag(k)));
        hashtags.dedup();

        ContentPayload::new(script, caption, hashtags, &trend.platform, persona, cost)
    }
}

/// Turn a phrase into a single lowercase hashtag.
fn hashtag(phrase: &str) -> String {
    let cleaned: String = phrase
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    format!("#{cleaned}")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
