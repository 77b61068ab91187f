//! Comparison of two audits of the same target

use crate::category::Category;
use crate::persistence::StoredAudit;
use crate::report::AuditReport;
use crate::scoring::{round1, Grade};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Improved,
    Regressed,
    Unchanged,
}

impl Direction {
    fn of(diff: f64) -> Self {
        if diff > 0.0 {
            Direction::Improved
        } else if diff < 0.0 {
            Direction::Regressed
        } else {
            Direction::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub old: f64,
    pub new: f64,
    pub diff: f64,
    pub direction: Direction,
}

impl ScoreChange {
    fn new(old: f64, new: f64) -> Self {
        let diff = round1(new - old);
        Self {
            old,
            new,
            diff,
            direction: Direction::of(diff),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditComparison {
    pub old_timestamp: DateTime<Utc>,
    pub new_timestamp: DateTime<Utc>,
    pub composite: ScoreChange,
    pub old_grade: Grade,
    pub new_grade: Grade,
    /// Union of both audits' categories; a missing side counts as 0
    pub categories: BTreeMap<Category, ScoreChange>,
    pub old_issue_count: usize,
    pub new_issue_count: usize,
    pub issue_count_diff: i64,
}

struct Snapshot {
    timestamp: DateTime<Utc>,
    composite: f64,
    grade: Grade,
    categories: BTreeMap<Category, f64>,
    issue_count: usize,
}

/// Compare two in-memory reports, `old` first
pub fn compare_reports(old: &AuditReport, new: &AuditReport) -> AuditComparison {
    compare(&report_snapshot(old), &report_snapshot(new))
}

/// Compare two stored records, `old` first
///
/// Issue counts come from the stored issue lists, which are capped.
pub fn compare_records(old: &StoredAudit, new: &StoredAudit) -> AuditComparison {
    compare(&record_snapshot(old), &record_snapshot(new))
}

fn report_snapshot(report: &AuditReport) -> Snapshot {
    Snapshot {
        timestamp: report.timestamp,
        composite: report.composite.score,
        grade: report.composite.grade,
        categories: report.category_scores(),
        issue_count: report.total_issues,
    }
}

fn record_snapshot(record: &StoredAudit) -> Snapshot {
    Snapshot {
        timestamp: record.created_at,
        composite: record.composite_score,
        grade: record.grade,
        categories: record.category_scores.clone(),
        issue_count: record.top_issues.len(),
    }
}

fn compare(old: &Snapshot, new: &Snapshot) -> AuditComparison {
    let categories = old
        .categories
        .keys()
        .chain(new.categories.keys())
        .map(|category| {
            let before = old.categories.get(category).copied().unwrap_or(0.0);
            let after = new.categories.get(category).copied().unwrap_or(0.0);
            (*category, ScoreChange::new(before, after))
        })
        .collect();

    AuditComparison {
        old_timestamp: old.timestamp,
        new_timestamp: new.timestamp,
        composite: ScoreChange::new(old.composite, new.composite),
        old_grade: old.grade,
        new_grade: new.grade,
        categories,
        old_issue_count: old.issue_count,
        new_issue_count: new.issue_count,
        issue_count_diff: new.issue_count as i64 - old.issue_count as i64,
    }
}
