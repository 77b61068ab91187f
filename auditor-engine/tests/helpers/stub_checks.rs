//! Deterministic check operations

use async_trait::async_trait;
use auditor_engine::category::Category;
use auditor_engine::error::CheckError;
use auditor_engine::target::TargetContext;
use auditor_engine::types::{
    CheckOperation, CheckOutcome, CheckResult, DependentCheckOperation, Issue, PriorResults,
};
use std::time::Duration;

/// Returns the same results every run, optionally after a delay
#[derive(Clone)]
pub struct StaticCheck {
    pub name: String,
    pub category: Category,
    pub checks: Vec<CheckResult>,
    pub extra_issues: Vec<Issue>,
    pub delay: Duration,
}

impl StaticCheck {
    pub fn new(name: &str, category: Category, checks: Vec<CheckResult>) -> Self {
        Self {
            name: name.to_string(),
            category,
            checks,
            extra_issues: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.extra_issues.push(issue);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CheckOperation for StaticCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    async fn run(&self, _target: &TargetContext) -> Result<CheckOutcome, CheckError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut outcome = CheckOutcome::new();
        for check in &self.checks {
            outcome.record(&self.name, check.clone());
        }
        for issue in &self.extra_issues {
            outcome.add_issue(issue.clone());
        }
        Ok(outcome)
    }
}

/// `passed` passing and `failed` failing checks of weight 1 in one category
pub fn mixed_check(name: &str, category: Category, passed: usize, failed: usize) -> StaticCheck {
    let mut checks = Vec::new();
    for i in 0..passed {
        checks.push(CheckResult::pass(format!("{} pass {}", name, i), 1.0, category, "ok"));
    }
    for i in 0..failed {
        checks.push(CheckResult::fail(format!("{} fail {}", name, i), 1.0, category, "not ok"));
    }
    StaticCheck::new(name, category, checks)
}

/// Always returns an error
pub struct FailingCheck {
    pub name: String,
    pub category: Category,
}

impl FailingCheck {
    pub fn new(name: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            category,
        }
    }
}

#[async_trait]
impl CheckOperation for FailingCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    async fn run(&self, _target: &TargetContext) -> Result<CheckOutcome, CheckError> {
        Err(CheckError::Network("connection refused".to_string()))
    }
}

/// Panics inside the task
pub struct PanickingCheck {
    pub name: String,
    pub category: Category,
}

#[async_trait]
impl CheckOperation for PanickingCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    async fn run(&self, _target: &TargetContext) -> Result<CheckOutcome, CheckError> {
        panic!("parser blew up");
    }
}

/// Sleeps far longer than any test deadline
pub struct SlowCheck {
    pub name: String,
    pub category: Category,
}

#[async_trait]
impl CheckOperation for SlowCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    async fn run(&self, _target: &TargetContext) -> Result<CheckOutcome, CheckError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(CheckOutcome::new())
    }
}

/// Dependent check keyed on the primary keyword
///
/// Passes when the module it depends on completed without error, and
/// records the keyword it searched for in the check details.
pub struct KeywordCheck {
    pub depends_on: String,
    pub fail_with: Option<String>,
}

#[async_trait]
impl DependentCheckOperation for KeywordCheck {
    fn name(&self) -> &str {
        "competitors"
    }

    fn category(&self) -> Category {
        Category::Competitors
    }

    async fn run(
        &self,
        target: &TargetContext,
        prior: &PriorResults,
    ) -> Result<CheckOutcome, CheckError> {
        if let Some(message) = &self.fail_with {
            return Err(CheckError::Failed(message.clone()));
        }

        let upstream_ok = prior
            .get(&self.depends_on)
            .map(|m| !m.is_failed())
            .unwrap_or(false);

        let mut outcome = CheckOutcome::new();
        let details = format!("keyword '{}'", target.primary_keyword());
        let check = if upstream_ok {
            CheckResult::pass("Map pack", 1.0, Category::Competitors, details)
        } else {
            CheckResult::fail("Map pack", 1.0, Category::Competitors, details)
        };
        outcome.record("competitors", check);
        Ok(outcome)
    }
}
