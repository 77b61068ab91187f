//! Audit progress events
//!
//! Sent on an optional `mpsc` channel supplied by the caller. A dropped
//! receiver does not affect the audit.

use crate::recommendations::RecommendationSource;
use crate::scoring::Grade;
use crate::types::Phase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuditEvent {
    /// Target validated, checks about to be dispatched
    AuditStarted {
        target: String,
        /// Number of registered check operations across both phases
        checks: usize,
        /// Unix timestamp (seconds since epoch)
        timestamp: i64,
    },

    /// A check phase is starting
    PhaseStarted {
        phase: Phase,
        /// Operations dispatched in this phase
        checks: usize,
    },

    /// One check operation finished (or was converted to a failure)
    CheckCompleted {
        module: String,
        phase: Phase,
        /// Module score, `None` if nothing was scorable
        score: Option<f64>,
        failed: bool,
    },

    /// Recommendations are ready
    RecommendationsReady {
        source: RecommendationSource,
        count: usize,
    },

    /// Report assembled
    AuditCompleted {
        composite_score: f64,
        grade: Grade,
        duration_ms: u64,
        persisted_id: Option<i64>,
    },
}
