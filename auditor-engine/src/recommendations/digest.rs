//! Condensed per-module digest sent to the AI collaborator

use crate::types::Issue;
use std::fmt::Write;

/// Score and ranked issues of one module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSummary {
    pub module: String,
    /// `None` when the module produced nothing scorable
    pub score: Option<f64>,
    /// Most severe first
    pub issues: Vec<Issue>,
}

/// Render module summaries as plain text, at most `issue_cap` issues each
pub fn build_digest(modules: &[ModuleSummary], issue_cap: usize) -> String {
    let mut digest = String::new();

    for (index, module) in modules.iter().enumerate() {
        if index > 0 {
            digest.push('\n');
        }
        let score = match module.score {
            Some(score) => format!("{:.1}/100", score),
            None => "N/A".to_string(),
        };
        // Writing to a String cannot fail
        let _ = writeln!(digest, "## {} (score: {})", module.module.to_uppercase(), score);

        if module.issues.is_empty() {
            digest.push_str("No major issues found.\n");
            continue;
        }

        digest.push_str("Issues:\n");
        for issue in module.issues.iter().take(issue_cap) {
            let _ = writeln!(digest, "- [severity {:.0}] {}", issue.severity, issue.description);
        }
        let hidden = module.issues.len().saturating_sub(issue_cap);
        if hidden > 0 {
            let _ = writeln!(digest, "- ... and {} more", hidden);
        }
    }

    digest
}
