//! Check result model and the check operation traits
//!
//! Every check operation produces `CheckResult`s plus the `Issue`s derived
//! from them. Results are immutable once the operation returns.

use crate::category::Category;
use crate::error::CheckError;
use crate::target::TargetContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Weight given to the synthetic result recorded for a failed module
pub const FAILURE_WEIGHT: f64 = 1.0;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl CheckStatus {
    /// Fraction of the check's weight credited toward its category
    pub fn credit_factor(&self) -> f64 {
        match self {
            CheckStatus::Pass => 1.0,
            CheckStatus::Warning => 0.5,
            CheckStatus::Fail => 0.0,
        }
    }

    /// Fraction of `weight * 100` used as issue severity
    fn severity_factor(&self) -> f64 {
        match self {
            CheckStatus::Pass => 0.0,
            CheckStatus::Warning => 0.5,
            CheckStatus::Fail => 1.0,
        }
    }
}

/// One atomic check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub weight: f64,
    pub category: Category,
    pub details: String,
}

impl CheckResult {
    pub fn new(
        name: impl Into<String>,
        status: CheckStatus,
        weight: f64,
        category: Category,
        details: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            weight,
            category,
            details: details.into(),
        }
    }

    pub fn pass(name: impl Into<String>, weight: f64, category: Category, details: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Pass, weight, category, details)
    }

    pub fn warning(name: impl Into<String>, weight: f64, category: Category, details: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warning, weight, category, details)
    }

    pub fn fail(name: impl Into<String>, weight: f64, category: Category, details: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Fail, weight, category, details)
    }

    /// Weight earned toward the category score
    pub fn credit(&self) -> f64 {
        self.weight * self.status.credit_factor()
    }

    pub fn has_valid_weight(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}

/// How an issue's severity was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeveritySource {
    /// Computed from the originating check's weight and status
    Derived,
    /// Set explicitly by the check operation
    Override,
}

/// Human-readable problem statement tied to its originating module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub module: String,
    pub category: Category,
    pub description: String,
    /// 0 to 100
    pub severity: f64,
    pub severity_source: SeveritySource,
}

impl Issue {
    /// Derive an issue from a non-passing check
    ///
    /// Severity is `weight * 100` for a failure and half that for a warning.
    /// Passing checks produce no issue.
    pub fn from_check(module: impl Into<String>, check: &CheckResult) -> Option<Self> {
        if check.status == CheckStatus::Pass {
            return None;
        }
        Some(Self {
            module: module.into(),
            category: check.category,
            description: format!("{}: {}", check.name, check.details),
            severity: clamp_severity(check.weight * 100.0 * check.status.severity_factor()),
            severity_source: SeveritySource::Derived,
        })
    }

    /// Issue with an explicit severity, clamped to 0..=100
    pub fn with_severity(
        module: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        severity: f64,
    ) -> Self {
        Self {
            module: module.into(),
            category,
            description: description.into(),
            severity: clamp_severity(severity),
            severity_source: SeveritySource::Override,
        }
    }
}

fn clamp_severity(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Everything one check operation produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
    pub checks: Vec<CheckResult>,
    pub issues: Vec<Issue>,
}

impl CheckOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a check and derive its issue when it did not pass
    pub fn record(&mut self, module: &str, check: CheckResult) {
        if let Some(issue) = Issue::from_check(module, &check) {
            self.issues.push(issue);
        }
        self.checks.push(check);
    }

    pub fn add_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Reject results that break the result model
    pub fn validate(&self) -> Result<(), CheckError> {
        if let Some(bad) = self.checks.iter().find(|c| !c.has_valid_weight()) {
            return Err(CheckError::InvalidResult(format!(
                "check '{}' has non-positive weight {}",
                bad.name, bad.weight
            )));
        }
        Ok(())
    }
}

/// Which phase a module ran in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Independent,
    Dependent,
}

/// Result of one check operation after the runner has handled failures
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOutcome {
    pub module: String,
    pub category: Category,
    pub phase: Phase,
    pub checks: Vec<CheckResult>,
    pub issues: Vec<Issue>,
    /// Set when the operation errored, panicked or timed out
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl ModuleOutcome {
    pub(crate) fn completed(
        module: String,
        category: Category,
        phase: Phase,
        outcome: CheckOutcome,
        elapsed_ms: u64,
    ) -> Self {
        let issues = outcome
            .issues
            .into_iter()
            .map(|mut issue| {
                issue.module = module.clone();
                issue
            })
            .collect();
        Self {
            module,
            category,
            phase,
            checks: outcome.checks,
            issues,
            error: None,
            elapsed_ms,
        }
    }

    /// Synthetic failed result standing in for an operation that did not finish
    pub(crate) fn failed(
        module: String,
        category: Category,
        phase: Phase,
        error: &CheckError,
        elapsed_ms: u64,
    ) -> Self {
        let check = CheckResult::fail(module.clone(), FAILURE_WEIGHT, category, error.to_string());
        let issues = Issue::from_check(module.clone(), &check).into_iter().collect();
        Self {
            module,
            category,
            phase,
            checks: vec![check],
            issues,
            error: Some(error.to_string()),
            elapsed_ms,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Phase-one results visible to dependent checks
#[derive(Debug, Clone, Default)]
pub struct PriorResults {
    modules: Vec<ModuleOutcome>,
}

impl PriorResults {
    pub fn new(modules: Vec<ModuleOutcome>) -> Self {
        Self { modules }
    }

    pub fn get(&self, module: &str) -> Option<&ModuleOutcome> {
        self.modules.iter().find(|m| m.module == module)
    }

    pub fn modules(&self) -> &[ModuleOutcome] {
        &self.modules
    }
}

/// Independent check operation (phase one)
///
/// Implementations run concurrently; an `Err` or panic is recorded as a
/// failed result for the module instead of aborting the audit.
#[async_trait]
pub trait CheckOperation: Send + Sync {
    /// Module name used to tag issues (e.g. "onpage", "gbp")
    fn name(&self) -> &str;

    /// Category of the synthetic result recorded if the operation fails
    fn category(&self) -> Category;

    async fn run(&self, target: &TargetContext) -> Result<CheckOutcome, CheckError>;

    /// Whether prerequisites (API keys, services) are present
    fn is_available(&self) -> bool {
        true
    }
}

/// Check operation that needs phase-one results (phase two)
#[async_trait]
pub trait DependentCheckOperation: Send + Sync {
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    async fn run(
        &self,
        target: &TargetContext,
        prior: &PriorResults,
    ) -> Result<CheckOutcome, CheckError>;

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_by_status() {
        assert_eq!(CheckResult::pass("a", 0.4, Category::Onpage, "").credit(), 0.4);
        assert_eq!(CheckResult::warning("a", 0.4, Category::Onpage, "").credit(), 0.2);
        assert_eq!(CheckResult::fail("a", 0.4, Category::Onpage, "").credit(), 0.0);
    }

    #[test]
    fn test_pass_produces_no_issue() {
        let check = CheckResult::pass("Title tag", 0.15, Category::Onpage, "ok");
        assert!(Issue::from_check("onpage", &check).is_none());
    }

    #[test]
    fn test_derived_severity() {
        let fail = CheckResult::fail("Title tag", 0.15, Category::Onpage, "missing");
        let issue = Issue::from_check("onpage", &fail).unwrap();
        assert!((issue.severity - 15.0).abs() < 1e-9);
        assert_eq!(issue.severity_source, SeveritySource::Derived);
        assert_eq!(issue.description, "Title tag: missing");

        let warn = CheckResult::warning("Title tag", 0.15, Category::Onpage, "too long");
        let issue = Issue::from_check("onpage", &warn).unwrap();
        assert!((issue.severity - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_override_severity_clamped() {
        let issue = Issue::with_severity("gbp", Category::Gbp, "No profile", 150.0);
        assert_eq!(issue.severity, 100.0);
        assert_eq!(issue.severity_source, SeveritySource::Override);

        let issue = Issue::with_severity("gbp", Category::Gbp, "x", f64::NAN);
        assert_eq!(issue.severity, 0.0);
    }

    #[test]
    fn test_outcome_rejects_zero_weight() {
        let mut outcome = CheckOutcome::new();
        outcome.record("onpage", CheckResult::pass("a", 0.0, Category::Onpage, ""));
        assert!(matches!(outcome.validate(), Err(CheckError::InvalidResult(_))));
    }

    #[test]
    fn test_failed_module_has_full_severity_issue() {
        let outcome = ModuleOutcome::failed(
            "citations".to_string(),
            Category::Citations,
            Phase::Independent,
            &CheckError::Failed("boom".to_string()),
            3,
        );
        assert_eq!(outcome.checks.len(), 1);
        assert_eq!(outcome.checks[0].status, CheckStatus::Fail);
        assert_eq!(outcome.checks[0].weight, FAILURE_WEIGHT);
        assert_eq!(outcome.issues[0].severity, 100.0);
        assert!(outcome.issues[0].description.contains("citations"));
        assert!(outcome.issues[0].description.contains("boom"));
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_completed_module_stamps_issue_module() {
        let mut outcome = CheckOutcome::new();
        outcome.add_issue(Issue::with_severity("", Category::Reviews, "Few reviews", 40.0));
        let module = ModuleOutcome::completed(
            "reviews".to_string(),
            Category::Reviews,
            Phase::Independent,
            outcome,
            1,
        );
        assert_eq!(module.issues[0].module, "reviews");
    }
}
