//! Test Helper Utilities
//!
//! Shared stubs for testing auditor-engine

#![allow(dead_code)]

pub mod db_utils;
pub mod stub_checks;
pub mod stub_collaborators;

pub use db_utils::{create_file_store, create_memory_store};
pub use stub_checks::{
    mixed_check, FailingCheck, KeywordCheck, PanickingCheck, SlowCheck, StaticCheck,
};
pub use stub_collaborators::{CannedGenerator, FailingStore};

use auditor_engine::report::AuditReport;

/// Report JSON with the run-dependent fields zeroed
pub fn stable_json(report: &AuditReport) -> String {
    let mut report = report.clone();
    report.duration_ms = 0;
    report.timestamp = chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).unwrap();
    report.to_json().unwrap()
}
