//! Deterministic recommendations derived from issue severity
//!
//! Used whenever the AI collaborator is missing, fails, or returns nothing
//! usable. Identical issue inputs always produce identical output.

use super::{sort_recommendations, Effort, Impact, Priority, Recommendation, ModuleSummary};
use crate::types::Issue;

const TITLE_MAX_CHARS: usize = 70;
const FALLBACK_ESTIMATED_TIME: &str = "1-3 hours";

/// Derive up to `max_total` recommendations from the top issues of each module
///
/// Never returns an empty list: with no issues at all a single
/// maintenance recommendation is produced.
pub fn fallback_recommendations(
    modules: &[ModuleSummary],
    per_module: usize,
    max_total: usize,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = modules
        .iter()
        .flat_map(|module| {
            let mut issues: Vec<&Issue> = module.issues.iter().collect();
            issues.sort_by(|a, b| b.severity.total_cmp(&a.severity));
            issues
                .into_iter()
                .take(per_module)
                .map(|issue| from_issue(&module.module, issue))
                .collect::<Vec<_>>()
        })
        .collect();

    sort_recommendations(&mut recommendations);
    recommendations.truncate(max_total.max(1));

    if recommendations.is_empty() {
        recommendations.push(maintain_standards());
    }
    recommendations
}

fn from_issue(module: &str, issue: &Issue) -> Recommendation {
    let impact = if issue.severity >= 80.0 {
        Impact::High
    } else {
        Impact::Medium
    };

    Recommendation::new(
        format!("Fix: {}", truncate_chars(&issue.description, TITLE_MAX_CHARS)),
        issue.description.clone(),
        module,
        Priority::from_severity(issue.severity),
        impact,
        Effort::Medium,
    )
    .with_estimated_time(FALLBACK_ESTIMATED_TIME)
}

fn maintain_standards() -> Recommendation {
    Recommendation::new(
        "Maintain current standards",
        "No significant issues were found. Keep monitoring and re-audit periodically.",
        "general",
        Priority::P3,
        Impact::Low,
        Effort::Medium,
    )
    .with_estimated_time("Ongoing")
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::recommendations::RecommendationGroup;

    fn module(name: &str, severities: &[f64]) -> ModuleSummary {
        ModuleSummary {
            module: name.to_string(),
            score: Some(50.0),
            issues: severities
                .iter()
                .enumerate()
                .map(|(i, s)| Issue::with_severity(name, Category::Onpage, format!("{} issue {}", name, i), *s))
                .collect(),
        }
    }

    #[test]
    fn test_mapping_from_severity() {
        let recs = fallback_recommendations(&[module("gbp", &[100.0, 60.0, 10.0])], 3, 15);
        assert_eq!(recs.len(), 3);

        assert_eq!(recs[0].priority, Priority::P1);
        assert_eq!(recs[0].estimated_impact, Impact::High);
        assert_eq!(recs[0].group, RecommendationGroup::HighImpact);

        assert_eq!(recs[1].priority, Priority::P2);
        assert_eq!(recs[1].estimated_impact, Impact::Medium);
        assert_eq!(recs[1].group, RecommendationGroup::LongTerm);

        assert_eq!(recs[2].priority, Priority::P3);
        assert!(recs.iter().all(|r| r.effort == Effort::Medium));
        assert!(recs.iter().all(|r| r.category == "gbp"));
    }

    #[test]
    fn test_per_module_cap_takes_most_severe() {
        let recs = fallback_recommendations(&[module("onpage", &[10.0, 95.0, 20.0, 85.0, 30.0])], 3, 15);
        assert_eq!(recs.len(), 3);
        let descriptions: Vec<&str> = recs.iter().map(|r| r.description.as_str()).collect();
        assert!(descriptions.contains(&"onpage issue 1"));
        assert!(descriptions.contains(&"onpage issue 3"));
        assert!(descriptions.contains(&"onpage issue 4"));
    }

    #[test]
    fn test_total_cap() {
        let modules: Vec<ModuleSummary> = (0..8)
            .map(|i| module(&format!("m{}", i), &[90.0, 70.0, 40.0]))
            .collect();
        let recs = fallback_recommendations(&modules, 3, 15);
        assert_eq!(recs.len(), 15);
        assert!(recs.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_no_issues_yields_single_recommendation() {
        let recs = fallback_recommendations(&[module("onpage", &[])], 3, 15);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::P3);
        assert_eq!(recs[0].group, RecommendationGroup::LongTerm);
    }

    #[test]
    fn test_deterministic() {
        let modules = vec![module("a", &[55.0, 55.0, 81.0]), module("b", &[55.0, 12.0])];
        assert_eq!(
            fallback_recommendations(&modules, 3, 15),
            fallback_recommendations(&modules, 3, 15)
        );
    }

    #[test]
    fn test_title_truncated_on_char_boundary() {
        let long = "é".repeat(100);
        let summary = ModuleSummary {
            module: "content".to_string(),
            score: None,
            issues: vec![Issue::with_severity("content", Category::Content, long, 90.0)],
        };
        let recs = fallback_recommendations(&[summary], 3, 15);
        assert_eq!(recs[0].title.chars().count(), "Fix: ".len() + TITLE_MAX_CHARS);
    }
}
