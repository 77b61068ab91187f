//! Synthesizer: AI path with deterministic fallback

use super::digest::{build_digest, ModuleSummary};
use super::draft::validate_drafts;
use super::fallback::fallback_recommendations;
use super::generator::{GenerationError, RecommendationGenerator};
use super::{sort_recommendations, Recommendation, RecommendationSource};
use auditor_common::config::AuditConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default deadline for one AI generation call
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on recommendations accepted from the AI path
pub const MAX_AI_RECOMMENDATIONS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizerSettings {
    pub digest_issue_cap: usize,
    pub fallback_issues_per_module: usize,
    pub fallback_max: usize,
    pub generation_timeout: Duration,
}

impl Default for SynthesizerSettings {
    fn default() -> Self {
        Self::from_config(&AuditConfig::default(), DEFAULT_GENERATION_TIMEOUT)
    }
}

impl SynthesizerSettings {
    pub fn from_config(config: &AuditConfig, generation_timeout: Duration) -> Self {
        Self {
            digest_issue_cap: config.digest_issue_cap,
            fallback_issues_per_module: config.fallback_issues_per_module,
            fallback_max: config.fallback_max,
            generation_timeout,
        }
    }
}

/// Sorted recommendations plus where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub recommendations: Vec<Recommendation>,
    pub source: RecommendationSource,
    /// Why the fallback was used, if it was
    pub fallback_reason: Option<String>,
    /// AI drafts dropped during validation
    pub dropped_drafts: usize,
}

pub struct RecommendationSynthesizer {
    generator: Option<Arc<dyn RecommendationGenerator>>,
    settings: SynthesizerSettings,
}

impl RecommendationSynthesizer {
    pub fn new(
        generator: Option<Arc<dyn RecommendationGenerator>>,
        settings: SynthesizerSettings,
    ) -> Self {
        Self { generator, settings }
    }

    /// Synthesizer that always uses the deterministic path
    pub fn fallback_only(settings: SynthesizerSettings) -> Self {
        Self::new(None, settings)
    }

    pub fn settings(&self) -> &SynthesizerSettings {
        &self.settings
    }

    pub async fn synthesize(&self, modules: &[ModuleSummary]) -> Synthesis {
        let generator = match &self.generator {
            Some(generator) => generator,
            None => return self.fallback(modules, GenerationError::NotConfigured.to_string(), 0),
        };

        let digest = build_digest(modules, self.settings.digest_issue_cap);
        let timeout = self.settings.generation_timeout;

        let generated = match tokio::time::timeout(timeout, generator.generate(&digest)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(timeout.as_millis() as u64)),
        };

        let items = match generated {
            Ok(items) => items,
            Err(err) => {
                warn!(generator = generator.name(), error = %err, "AI recommendations unavailable, using fallback");
                return self.fallback(modules, err.to_string(), 0);
            }
        };

        let validated = validate_drafts(items);
        if validated.accepted.is_empty() {
            warn!(
                generator = generator.name(),
                dropped = validated.dropped,
                "No AI recommendation passed validation, using fallback"
            );
            return self.fallback(
                modules,
                "no conforming recommendations".to_string(),
                validated.dropped,
            );
        }

        let mut recommendations = validated.accepted;
        sort_recommendations(&mut recommendations);
        recommendations.truncate(MAX_AI_RECOMMENDATIONS);

        info!(
            generator = generator.name(),
            count = recommendations.len(),
            dropped = validated.dropped,
            "AI recommendations accepted"
        );

        Synthesis {
            recommendations,
            source: RecommendationSource::Ai,
            fallback_reason: None,
            dropped_drafts: validated.dropped,
        }
    }

    fn fallback(&self, modules: &[ModuleSummary], reason: String, dropped_drafts: usize) -> Synthesis {
        let recommendations = fallback_recommendations(
            modules,
            self.settings.fallback_issues_per_module,
            self.settings.fallback_max,
        );
        Synthesis {
            recommendations,
            source: RecommendationSource::Fallback,
            fallback_reason: Some(reason),
            dropped_drafts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::recommendations::Priority;
    use crate::types::Issue;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Canned(Result<Vec<Value>, ()>);

    #[async_trait]
    impl RecommendationGenerator for Canned {
        fn name(&self) -> &str {
            "canned"
        }
        async fn generate(&self, _digest: &str) -> Result<Vec<Value>, GenerationError> {
            match &self.0 {
                Ok(items) => Ok(items.clone()),
                Err(()) => Err(GenerationError::Parse("garbage".to_string())),
            }
        }
    }

    struct Stalled;

    #[async_trait]
    impl RecommendationGenerator for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }
        async fn generate(&self, _digest: &str) -> Result<Vec<Value>, GenerationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![])
        }
    }

    fn modules() -> Vec<ModuleSummary> {
        vec![ModuleSummary {
            module: "gbp".to_string(),
            score: Some(20.0),
            issues: vec![
                Issue::with_severity("gbp", Category::Gbp, "No business profile", 100.0),
                Issue::with_severity("gbp", Category::Gbp, "Few photos", 40.0),
            ],
        }]
    }

    fn synthesizer(generator: Option<Arc<dyn RecommendationGenerator>>) -> RecommendationSynthesizer {
        let settings = SynthesizerSettings {
            generation_timeout: Duration::from_millis(100),
            ..SynthesizerSettings::default()
        };
        RecommendationSynthesizer::new(generator, settings)
    }

    #[tokio::test]
    async fn test_ai_path_sorted() {
        let generator = Canned(Ok(vec![
            json!({"title": "later", "priority": "P3", "estimated_impact": "low", "effort": "easy"}),
            json!({"title": "first", "priority": "P1", "estimated_impact": "high", "effort": "easy"}),
            json!({"title": "broken", "priority": "P9", "estimated_impact": "low", "effort": "easy"}),
        ]));
        let result = synthesizer(Some(Arc::new(generator))).synthesize(&modules()).await;

        assert_eq!(result.source, RecommendationSource::Ai);
        assert_eq!(result.dropped_drafts, 1);
        let titles: Vec<&str> = result.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "later"]);
    }

    #[tokio::test]
    async fn test_ai_path_capped_after_sorting() {
        let mut drafts: Vec<Value> = (0..24)
            .map(|i| json!({"title": format!("minor {}", i), "priority": "P3", "estimated_impact": "low", "effort": "hard"}))
            .collect();
        drafts.push(json!({"title": "urgent", "priority": "P1", "estimated_impact": "high", "effort": "easy"}));

        let result = synthesizer(Some(Arc::new(Canned(Ok(drafts))))).synthesize(&modules()).await;

        assert_eq!(result.source, RecommendationSource::Ai);
        assert_eq!(result.recommendations.len(), MAX_AI_RECOMMENDATIONS);
        assert_eq!(result.recommendations[0].title, "urgent");
    }

    #[tokio::test]
    async fn test_parse_error_falls_back() {
        let result = synthesizer(Some(Arc::new(Canned(Err(()))))).synthesize(&modules()).await;
        assert_eq!(result.source, RecommendationSource::Fallback);
        assert_eq!(result.recommendations[0].priority, Priority::P1);
        assert!((1..=15).contains(&result.recommendations.len()));
    }

    #[tokio::test]
    async fn test_all_invalid_falls_back() {
        let generator = Canned(Ok(vec![json!({"title": "x"}), json!(null)]));
        let result = synthesizer(Some(Arc::new(generator))).synthesize(&modules()).await;
        assert_eq!(result.source, RecommendationSource::Fallback);
        assert_eq!(result.dropped_drafts, 2);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let result = synthesizer(Some(Arc::new(Stalled))).synthesize(&modules()).await;
        assert_eq!(result.source, RecommendationSource::Fallback);
        assert!(result.fallback_reason.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_no_generator_falls_back() {
        let result = synthesizer(None).synthesize(&modules()).await;
        assert_eq!(result.source, RecommendationSource::Fallback);
        assert_eq!(result.recommendations.len(), 2);
    }
}
