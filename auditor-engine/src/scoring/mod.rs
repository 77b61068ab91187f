//! Scoring model
//!
//! Category score: `100 * (pass weight + 0.5 * warning weight) / total weight`.
//! Composite: weighted mean over the categories that both appear in the
//! weight map and produced data. Scores are rounded to one decimal place.

pub mod weights;

pub use weights::{WeightMap, WeightMapError, WEIGHT_SUM_TOLERANCE};

use crate::category::Category;
use crate::types::{CheckResult, CheckStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Letter grade derived from a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "F" => Ok(Grade::F),
            other => Err(format!("unknown grade '{}'", other)),
        }
    }
}

/// Aggregate over all checks sharing a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: f64,
    pub total_weight: f64,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

/// Weighted combination of category scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: f64,
    pub grade: Grade,
    /// Sum of the weights of categories that had data
    pub weight_used: f64,
}

/// Score a set of checks, `None` when there is nothing to score
pub fn score_checks<'a, I>(checks: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a CheckResult>,
{
    let (earned, total) = checks
        .into_iter()
        .filter(|c| c.has_valid_weight())
        .fold((0.0, 0.0), |(earned, total), c| (earned + c.credit(), total + c.weight));

    if total <= 0.0 {
        return None;
    }
    Some(round1((100.0 * earned / total).clamp(0.0, 100.0)))
}

/// Group checks by their own category and score each group
///
/// Grouping follows `CheckResult::category`, not the module that produced the
/// check, so attribution is independent of completion order.
pub fn category_scores<'a, I>(checks: I) -> BTreeMap<Category, CategoryScore>
where
    I: IntoIterator<Item = &'a CheckResult>,
{
    let mut grouped: BTreeMap<Category, Vec<&CheckResult>> = BTreeMap::new();
    for check in checks {
        grouped.entry(check.category).or_default().push(check);
    }

    grouped
        .into_iter()
        .filter_map(|(category, checks)| {
            let score = score_checks(checks.iter().copied())?;
            let count = |status: CheckStatus| checks.iter().filter(|c| c.status == status).count();
            Some((
                category,
                CategoryScore {
                    category,
                    score,
                    total_weight: checks.iter().map(|c| c.weight).sum(),
                    passed: count(CheckStatus::Pass),
                    warnings: count(CheckStatus::Warning),
                    failed: count(CheckStatus::Fail),
                },
            ))
        })
        .collect()
}

/// Weighted composite over the categories present in both inputs
///
/// Categories missing from `scores` contribute to neither numerator nor
/// denominator. With no usable weight the composite is 0 and grade F.
pub fn composite(scores: &BTreeMap<Category, f64>, weights: &WeightMap) -> CompositeScore {
    let (weighted, weight_used) = weights
        .iter()
        .filter_map(|(category, weight)| scores.get(&category).map(|s| (s.clamp(0.0, 100.0), weight)))
        .fold((0.0, 0.0), |(sum, used), (score, weight)| (sum + score * weight, used + weight));

    let score = if weight_used > 0.0 {
        round1((weighted / weight_used).clamp(0.0, 100.0))
    } else {
        0.0
    };

    CompositeScore {
        score,
        grade: Grade::from_score(score),
        weight_used,
    }
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
