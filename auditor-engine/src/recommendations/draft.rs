//! Strict validation of AI-drafted recommendations
//!
//! Each draft is deserialized on its own so that one malformed item only
//! drops that item. Enum fields are matched case-insensitively; anything
//! outside the allowed values drops the item.

use super::{Effort, Impact, Priority, Recommendation};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Deserialize)]
struct RecommendationDraft {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<String>,
    priority: String,
    #[serde(alias = "estimatedImpact", alias = "impact")]
    estimated_impact: String,
    effort: String,
    #[serde(default, alias = "estimatedTime")]
    estimated_time: Option<String>,
}

impl TryFrom<RecommendationDraft> for Recommendation {
    type Error = String;

    fn try_from(draft: RecommendationDraft) -> Result<Self, Self::Error> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err("empty title".to_string());
        }

        let priority: Priority = draft.priority.parse()?;
        let impact: Impact = draft.estimated_impact.parse()?;
        let effort: Effort = draft.effort.parse()?;

        let category = draft
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let mut recommendation = Recommendation::new(
            title,
            draft.description.trim(),
            category,
            priority,
            impact,
            effort,
        );
        recommendation.estimated_time = draft
            .estimated_time
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(recommendation)
    }
}

/// Outcome of validating a batch of drafts
#[derive(Debug, Default)]
pub struct ValidatedDrafts {
    pub accepted: Vec<Recommendation>,
    pub dropped: usize,
}

/// Keep the drafts that conform, in their original order
pub fn validate_drafts(items: Vec<Value>) -> ValidatedDrafts {
    let mut validated = ValidatedDrafts::default();

    for (index, item) in items.into_iter().enumerate() {
        let converted = serde_json::from_value::<RecommendationDraft>(item)
            .map_err(|e| e.to_string())
            .and_then(Recommendation::try_from);

        match converted {
            Ok(recommendation) => validated.accepted.push(recommendation),
            Err(reason) => {
                debug!(index, reason = %reason, "Dropping non-conforming recommendation");
                validated.dropped += 1;
            }
        }
    }

    validated
}
