//! Issue aggregator
//!
//! Flattens per-module issues, drops exact duplicates and orders the result
//! by descending severity. The sort is stable so ties keep module order.

use crate::types::{Issue, ModuleOutcome};
use std::collections::HashSet;

/// Flatten and rank issues from `(module, issues)` pairs in module order
///
/// Every issue is tagged with the module it came from. When the same module
/// reports the same description twice only the most severe copy is kept.
/// The full list is returned; truncation belongs to the caller.
pub fn aggregate<'a, I>(per_module: I) -> Vec<Issue>
where
    I: IntoIterator<Item = (&'a str, &'a [Issue])>,
{
    let mut flattened: Vec<Issue> = per_module
        .into_iter()
        .flat_map(|(module, issues)| {
            issues.iter().map(move |issue| {
                let mut issue = issue.clone();
                issue.module = module.to_string();
                issue
            })
        })
        .collect();

    flattened.sort_by(|a, b| b.severity.total_cmp(&a.severity));

    let mut seen = HashSet::new();
    flattened.retain(|issue| seen.insert((issue.module.clone(), issue.description.clone())));
    flattened
}

/// Aggregate the issues of finished modules
pub fn aggregate_outcomes(modules: &[ModuleOutcome]) -> Vec<Issue> {
    aggregate(
        modules
            .iter()
            .map(|m| (m.module.as_str(), m.issues.as_slice())),
    )
}

/// First `n` issues of an aggregated list
pub fn top_n(issues: &[Issue], n: usize) -> Vec<Issue> {
    issues.iter().take(n).cloned().collect()
}
