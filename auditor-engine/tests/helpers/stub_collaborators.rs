//! Stub AI generator and persistence store

use async_trait::async_trait;
use auditor_common::{Error, Result};
use auditor_engine::persistence::{AuditRecordInput, AuditStore};
use auditor_engine::recommendations::{GenerationError, RecommendationGenerator};
use auditor_engine::target::TargetIdentity;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Replays a fixed response and records the digests it was given
pub struct CannedGenerator {
    response: std::result::Result<Vec<Value>, String>,
    calls: AtomicUsize,
    digests: Mutex<Vec<String>>,
}

impl CannedGenerator {
    pub fn returning(items: Vec<Value>) -> Self {
        Self {
            response: Ok(items),
            calls: AtomicUsize::new(0),
            digests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            digests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_digest(&self) -> Option<String> {
        self.digests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RecommendationGenerator for CannedGenerator {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, digest: &str) -> std::result::Result<Vec<Value>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.digests.lock().unwrap().push(digest.to_string());
        match &self.response {
            Ok(items) if items.is_empty() => Err(GenerationError::Empty),
            Ok(items) => Ok(items.clone()),
            Err(message) => Err(GenerationError::Parse(message.clone())),
        }
    }
}

/// Store whose every write fails
pub struct FailingStore;

#[async_trait]
impl AuditStore for FailingStore {
    async fn upsert_target_profile(&self, _identity: &TargetIdentity) -> Result<i64> {
        Err(Error::Internal("disk full".to_string()))
    }

    async fn insert_audit_record(&self, _profile_id: i64, _record: AuditRecordInput<'_>) -> Result<i64> {
        Err(Error::Internal("disk full".to_string()))
    }
}
