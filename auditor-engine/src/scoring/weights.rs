//! Composite weight maps
//!
//! A weight map assigns each participating category its share of the
//! composite score. Weights must be positive and sum to 1.

use crate::category::{AuditProfile, Category};
use std::collections::BTreeMap;
use thiserror::Error;

/// Allowed drift of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum WeightMapError {
    #[error("Weight map is empty")]
    Empty,

    #[error("Weight for '{category}' must be positive, got {weight}")]
    NonPositive { category: String, weight: f64 },

    #[error("Weights must sum to 1.0, got {0}")]
    BadSum(f64),

    #[error("Unknown category in weight map: {0}")]
    UnknownCategory(String),
}

/// Validated category weights
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMap {
    weights: BTreeMap<Category, f64>,
}

impl WeightMap {
    pub fn new(weights: BTreeMap<Category, f64>) -> Result<Self, WeightMapError> {
        if weights.is_empty() {
            return Err(WeightMapError::Empty);
        }
        for (category, &weight) in &weights {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(WeightMapError::NonPositive {
                    category: category.to_string(),
                    weight,
                });
            }
        }
        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightMapError::BadSum(sum));
        }
        Ok(Self { weights })
    }

    /// Build from category names as found in configuration files
    pub fn from_names(names: &BTreeMap<String, f64>) -> Result<Self, WeightMapError> {
        let mut weights = BTreeMap::new();
        for (name, &weight) in names {
            let category = name
                .parse::<Category>()
                .map_err(|_| WeightMapError::UnknownCategory(name.clone()))?;
            weights.insert(category, weight);
        }
        Self::new(weights)
    }

    /// Built-in map for an audit profile
    pub fn for_profile(profile: AuditProfile) -> Self {
        let pairs: &[(Category, f64)] = match profile {
            AuditProfile::LocalBusiness => &[
                (Category::Onpage, 0.25),
                (Category::Gbp, 0.25),
                (Category::Citations, 0.15),
                (Category::Reviews, 0.15),
                (Category::Content, 0.10),
                (Category::Backlinks, 0.10),
            ],
            AuditProfile::Page => &[
                (Category::Crawlability, 0.20),
                (Category::Performance, 0.25),
                (Category::Security, 0.15),
                (Category::Mobile, 0.15),
                (Category::ContentQuality, 0.15),
                (Category::Indexability, 0.10),
            ],
            AuditProfile::Content => &[
                (Category::Readability, 0.25),
                (Category::Seo, 0.30),
                (Category::Uniqueness, 0.15),
                (Category::Headings, 0.15),
                (Category::Length, 0.15),
            ],
        };
        Self {
            weights: pairs.iter().copied().collect(),
        }
    }

    pub fn weight(&self, category: Category) -> Option<f64> {
        self.weights.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.weights.iter().map(|(c, w)| (*c, *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
