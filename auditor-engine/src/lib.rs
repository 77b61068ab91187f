//! Heuristic audit engine
//!
//! Runs a panel of independent check operations against a target (web page,
//! local business, piece of content), scores the results into category and
//! composite scores, ranks the issues found and synthesizes a prioritized
//! action plan. Individual check failures and AI failures degrade the
//! report; they never abort it.

pub mod category;
pub mod compare;
pub mod config;
pub mod error;
pub mod events;
pub mod issues;
pub mod orchestrator;
pub mod persistence;
pub mod recommendations;
pub mod report;
pub mod runner;
pub mod scoring;
pub mod target;
pub mod types;

pub use category::{AuditProfile, Category};
pub use error::{AuditError, AuditResult, CheckError};
pub use events::AuditEvent;
pub use orchestrator::{AuditOptions, AuditOrchestrator};
pub use report::AuditReport;
pub use target::{TargetContext, TargetIdentity, TargetKind};
pub use types::{
    CheckOperation, CheckOutcome, CheckResult, CheckStatus, DependentCheckOperation, Issue,
    PriorResults,
};
