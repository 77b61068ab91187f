//! Audit persistence
//!
//! The orchestrator only sees the `AuditStore` trait. Failures are logged
//! by the caller and never fail an audit.

pub mod sqlite;

pub use sqlite::SqliteAuditStore;

use crate::category::{AuditProfile, Category};
use crate::recommendations::Recommendation;
use crate::scoring::{CategoryScore, CompositeScore, Grade};
use crate::target::TargetIdentity;
use crate::types::Issue;
use async_trait::async_trait;
use auditor_common::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Issues stored per audit record
pub const STORED_ISSUE_LIMIT: usize = 50;

/// Recommendations stored per audit record
pub const STORED_RECOMMENDATION_LIMIT: usize = 30;

/// Everything written for one finished audit
#[derive(Debug, Clone, Copy)]
pub struct AuditRecordInput<'a> {
    pub audit_run_id: Uuid,
    pub profile: AuditProfile,
    pub composite: &'a CompositeScore,
    pub category_scores: &'a [CategoryScore],
    /// Aggregated issues, most severe first
    pub issues: &'a [Issue],
    pub recommendations: &'a [Recommendation],
}

/// An audit record read back from storage
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAudit {
    pub id: i64,
    pub profile_id: i64,
    pub audit_run_id: Uuid,
    pub audit_profile: String,
    pub composite_score: f64,
    pub grade: Grade,
    pub category_scores: BTreeMap<Category, f64>,
    pub top_issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Insert or refresh the audited entity, returning its id
    async fn upsert_target_profile(&self, identity: &TargetIdentity) -> Result<i64>;

    /// Store one finished audit, returning the new record id
    async fn insert_audit_record(&self, profile_id: i64, record: AuditRecordInput<'_>) -> Result<i64>;
}
