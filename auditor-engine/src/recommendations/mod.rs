//! Recommendation synthesizer
//!
//! Turns ranked issues into a prioritized action plan. An AI collaborator
//! drafts the plan when one is configured; otherwise, or when it fails,
//! a deterministic fallback derived from issue severity is used.

pub mod digest;
pub mod draft;
pub mod fallback;
pub mod generator;
pub mod llm_client;
pub mod synthesizer;

pub use digest::{build_digest, ModuleSummary};
pub use generator::{parse_generation_payload, GenerationError, RecommendationGenerator};
pub use llm_client::LlmRecommendationClient;
pub use synthesizer::{
    RecommendationSynthesizer, Synthesis, SynthesizerSettings, MAX_AI_RECOMMENDATIONS,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
}

impl Priority {
    /// P1 at 80 and above, P2 at 50 and above, P3 otherwise
    pub fn from_severity(severity: f64) -> Self {
        if severity >= 80.0 {
            Priority::P1
        } else if severity >= 50.0 {
            Priority::P2
        } else {
            Priority::P3
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P1" => Ok(Priority::P1),
            "P2" => Ok(Priority::P2),
            "P3" => Ok(Priority::P3),
            other => Err(format!("invalid priority '{}'", other)),
        }
    }
}

/// Expected impact; declaration order is the sort order (most severe first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Impact::High),
            "medium" => Ok(Impact::Medium),
            "low" => Ok(Impact::Low),
            other => Err(format!("invalid impact '{}'", other)),
        }
    }
}

/// Implementation effort; declaration order is the sort order (easiest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Effort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Effort::Easy),
            "medium" => Ok(Effort::Medium),
            "hard" => Ok(Effort::Hard),
            other => Err(format!("invalid effort '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationGroup {
    QuickWins,
    HighImpact,
    LongTerm,
}

impl RecommendationGroup {
    /// Quick wins are easy with high or medium impact; high impact covers
    /// the remaining high-impact work; everything else is long term.
    pub fn classify(impact: Impact, effort: Effort) -> Self {
        match (impact, effort) {
            (Impact::High | Impact::Medium, Effort::Easy) => RecommendationGroup::QuickWins,
            (Impact::High, Effort::Medium | Effort::Hard) => RecommendationGroup::HighImpact,
            _ => RecommendationGroup::LongTerm,
        }
    }
}

/// Where the recommendations of a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Ai,
    Fallback,
}

impl fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationSource::Ai => f.write_str("ai"),
            RecommendationSource::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub estimated_impact: Impact,
    pub effort: Effort,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    pub group: RecommendationGroup,
}

impl Recommendation {
    /// Build a recommendation; the group is always derived from impact and effort
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        priority: Priority,
        estimated_impact: Impact,
        effort: Effort,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
            priority,
            estimated_impact,
            effort,
            estimated_time: None,
            group: RecommendationGroup::classify(estimated_impact, effort),
        }
    }

    pub fn with_estimated_time(mut self, estimated_time: impl Into<String>) -> Self {
        self.estimated_time = Some(estimated_time.into());
        self
    }
}

/// Stable sort: priority, then impact (most severe first), then effort (easiest first)
pub fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by_key(|r| (r.priority, r.estimated_impact, r.effort));
}
