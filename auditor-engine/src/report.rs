//! Audit report: the terminal artifact of one audit

use crate::category::{AuditProfile, Category};
use crate::recommendations::{Recommendation, RecommendationSource};
use crate::scoring::{CategoryScore, CompositeScore, WeightMap};
use crate::target::TargetIdentity;
use crate::types::{CheckResult, Issue, ModuleOutcome, Phase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub target: TargetIdentity,
    pub profile: AuditProfile,
    pub composite: CompositeScore,
    /// In category order
    pub categories: Vec<CategoryReport>,
    /// In registration order, phase one first
    pub modules: Vec<ModuleReport>,
    /// Most severe issues, already truncated
    pub top_issues: Vec<Issue>,
    /// Issue count before truncation
    pub total_issues: usize,
    pub recommendations: Vec<Recommendation>,
    pub recommendation_source: RecommendationSource,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub persisted_id: Option<i64>,
}

/// Checks, issues and score of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: Category,
    pub score: f64,
    /// Share of the composite; `None` when the category is reported only
    pub weight: Option<f64>,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
    pub checks: Vec<CheckResult>,
    pub issues: Vec<Issue>,
}

/// Per-module status line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: String,
    pub phase: Phase,
    pub category: Category,
    pub score: Option<f64>,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checks: usize,
    pub issues: usize,
}

impl AuditReport {
    /// Pretty JSON with stable field names
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn module(&self, module: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.module == module)
    }

    /// Category scores keyed by category
    pub fn category_scores(&self) -> BTreeMap<Category, f64> {
        self.categories.iter().map(|c| (c.category, c.score)).collect()
    }
}

/// Group module checks and ranked issues under their categories
pub(crate) fn category_reports(
    scores: &BTreeMap<Category, CategoryScore>,
    modules: &[ModuleOutcome],
    ranked_issues: &[Issue],
    weights: &WeightMap,
) -> Vec<CategoryReport> {
    scores
        .values()
        .map(|score| CategoryReport {
            category: score.category,
            score: score.score,
            weight: weights.weight(score.category),
            passed: score.passed,
            warnings: score.warnings,
            failed: score.failed,
            checks: modules
                .iter()
                .flat_map(|m| m.checks.iter())
                .filter(|c| c.category == score.category)
                .cloned()
                .collect(),
            issues: ranked_issues
                .iter()
                .filter(|i| i.category == score.category)
                .cloned()
                .collect(),
        })
        .collect()
}

pub(crate) fn module_report(module: &ModuleOutcome, score: Option<f64>) -> ModuleReport {
    ModuleReport {
        module: module.module.clone(),
        phase: module.phase,
        category: module.category,
        score,
        failed: module.is_failed(),
        error: module.error.clone(),
        checks: module.checks.len(),
        issues: module.issues.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::AuditProfile;
    use crate::scoring::category_scores;
    use crate::types::{CheckOutcome, ModuleOutcome};

    fn module() -> ModuleOutcome {
        let mut outcome = CheckOutcome::new();
        outcome.record("onpage", CheckResult::pass("Title", 0.5, Category::Onpage, "ok"));
        outcome.record("onpage", CheckResult::fail("H1", 0.5, Category::Onpage, "missing"));
        outcome.record("onpage", CheckResult::fail("Schema", 0.2, Category::Technical, "none"));
        ModuleOutcome::completed("onpage".to_string(), Category::Onpage, Phase::Independent, outcome, 0)
    }

    #[test]
    fn test_category_reports_split_by_check_category() {
        let modules = vec![module()];
        let scores = category_scores(modules.iter().flat_map(|m| m.checks.iter()));
        let issues = crate::issues::aggregate_outcomes(&modules);
        let weights = WeightMap::for_profile(AuditProfile::LocalBusiness);

        let reports = category_reports(&scores, &modules, &issues, &weights);
        assert_eq!(reports.len(), 2);

        let onpage = &reports[0];
        assert_eq!(onpage.category, Category::Onpage);
        assert_eq!(onpage.score, 50.0);
        assert_eq!(onpage.weight, Some(0.25));
        assert_eq!(onpage.checks.len(), 2);
        assert_eq!(onpage.issues.len(), 1);

        let technical = &reports[1];
        assert_eq!(technical.category, Category::Technical);
        assert_eq!(technical.weight, None);
        assert_eq!(technical.issues[0].description, "Schema: none");
    }

    #[test]
    fn test_module_report_counts() {
        let report = module_report(&module(), Some(41.7));
        assert_eq!(report.checks, 3);
        assert_eq!(report.issues, 2);
        assert!(!report.failed);
        assert!(report.error.is_none());
    }
}
