//! SQLite audit store
//!
//! Writes go through `retry_on_lock`; all JSON is serialized before the
//! retry loop so a retry only repeats the statement.

use super::{
    AuditRecordInput, AuditStore, StoredAudit, STORED_ISSUE_LIMIT, STORED_RECOMMENDATION_LIMIT,
};
use crate::category::Category;
use crate::target::TargetIdentity;
use async_trait::async_trait;
use auditor_common::db::{get_setting_i64, init_database, retry_on_lock};
use auditor_common::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

const DEFAULT_MAX_LOCK_WAIT_MS: i64 = 5000;

pub struct SqliteAuditStore {
    pool: SqlitePool,
    max_lock_wait_ms: u64,
}

impl SqliteAuditStore {
    /// Wrap a pool whose schema is already initialized
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let max_lock_wait_ms =
            get_setting_i64(&pool, "database_max_lock_wait_ms", DEFAULT_MAX_LOCK_WAIT_MS).await?;
        Ok(Self {
            pool,
            max_lock_wait_ms: max_lock_wait_ms.max(0) as u64,
        })
    }

    /// Open (creating if needed) the database file and wrap it
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = init_database(db_path).await?;
        Self::new(pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Id of a previously stored target, if any
    pub async fn find_profile(&self, identity: &TargetIdentity) -> Result<Option<i64>> {
        let id = sqlx::query_scalar(
            "SELECT id FROM target_profiles WHERE kind = ? AND name = ? AND domain = ?",
        )
        .bind(identity.kind.as_str())
        .bind(&identity.name)
        .bind(identity.domain.as_deref().unwrap_or(""))
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    /// Stored audits for a target, newest first
    pub async fn recent_audits(&self, profile_id: i64, limit: usize) -> Result<Vec<StoredAudit>> {
        let rows = sqlx::query(
            r#"
            SELECT id, profile_id, audit_run_id, audit_profile, composite_score, grade,
                   category_scores_json, top_issues_json, recommendations_json, created_at
            FROM audit_records
            WHERE profile_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(profile_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stored_audit_from_row).collect()
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn upsert_target_profile(&self, identity: &TargetIdentity) -> Result<i64> {
        let kind = identity.kind.as_str();
        let name = identity.name.as_str();
        let domain = identity.domain.as_deref().unwrap_or("");
        let location = identity.location.as_deref();
        let now = Utc::now().to_rfc3339();

        retry_on_lock("upsert target profile", self.max_lock_wait_ms, || async {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO target_profiles (kind, name, domain, location, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(kind, name, domain) DO UPDATE SET
                    location = COALESCE(excluded.location, target_profiles.location),
                    updated_at = excluded.updated_at
                RETURNING id
                "#,
            )
            .bind(kind)
            .bind(name)
            .bind(domain)
            .bind(location)
            .bind(&now)
            .bind(&now)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

            Ok(id)
        })
        .await
    }

    async fn insert_audit_record(&self, profile_id: i64, record: AuditRecordInput<'_>) -> Result<i64> {
        let audit_run_id = record.audit_run_id.to_string();
        let audit_profile = record.profile.as_str();
        let grade = record.composite.grade.as_str();
        let composite_score = record.composite.score;

        let category_scores: BTreeMap<Category, f64> = record
            .category_scores
            .iter()
            .map(|c| (c.category, c.score))
            .collect();
        let category_scores_json = to_json("category scores", &category_scores)?;
        let issues_json = to_json(
            "issues",
            &record.issues.iter().take(STORED_ISSUE_LIMIT).collect::<Vec<_>>(),
        )?;
        let recommendations_json = to_json(
            "recommendations",
            &record
                .recommendations
                .iter()
                .take(STORED_RECOMMENDATION_LIMIT)
                .collect::<Vec<_>>(),
        )?;
        let created_at = Utc::now().to_rfc3339();

        retry_on_lock("insert audit record", self.max_lock_wait_ms, || async {
            let result = sqlx::query(
                r#"
                INSERT INTO audit_records (
                    profile_id, audit_run_id, audit_profile, composite_score, grade,
                    category_scores_json, top_issues_json, recommendations_json, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(profile_id)
            .bind(&audit_run_id)
            .bind(audit_profile)
            .bind(composite_score)
            .bind(grade)
            .bind(&category_scores_json)
            .bind(&issues_json)
            .bind(&recommendations_json)
            .bind(&created_at)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

            Ok(result.last_insert_rowid())
        })
        .await
    }
}

fn to_json<T: Serialize + ?Sized>(what: &str, value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Internal(format!("Failed to serialize {}: {}", what, e)))
}

fn from_json<T: serde::de::DeserializeOwned>(what: &str, text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| Error::Internal(format!("Failed to deserialize {}: {}", what, e)))
}

fn stored_audit_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredAudit> {
    let audit_run_id: String = row.try_get("audit_run_id")?;
    let grade: String = row.try_get("grade")?;
    let created_at: String = row.try_get("created_at")?;
    let category_scores: String = row.try_get("category_scores_json")?;
    let top_issues: String = row.try_get("top_issues_json")?;
    let recommendations: String = row.try_get("recommendations_json")?;

    Ok(StoredAudit {
        id: row.try_get("id")?,
        profile_id: row.try_get("profile_id")?,
        audit_run_id: Uuid::parse_str(&audit_run_id)
            .map_err(|e| Error::Internal(format!("Invalid audit_run_id: {}", e)))?,
        audit_profile: row.try_get("audit_profile")?,
        composite_score: row.try_get("composite_score")?,
        grade: grade.parse().map_err(Error::Internal)?,
        category_scores: from_json("category scores", &category_scores)?,
        top_issues: from_json("issues", &top_issues)?,
        recommendations: from_json("recommendations", &recommendations)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| Error::Internal(format!("Invalid created_at: {}", e)))?
            .with_timezone(&Utc),
    })
}
