//! Error types for auditor-engine
//!
//! Check failures never abort an audit: the runner converts every
//! `CheckError` into a failed result for the module. Only `AuditError`
//! reaches the caller of `run_audit`.

use thiserror::Error;

/// Failure of a single check operation
#[derive(Debug, Error)]
pub enum CheckError {
    /// The check ran but could not reach a verdict
    #[error("Check failed: {0}")]
    Failed(String),

    /// The audit deadline passed before the check finished
    #[error("Timed out before the audit deadline")]
    Timeout,

    /// A dependency of the check (API key, upstream service) is missing
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Network failure while fetching data
    #[error("Network error: {0}")]
    Network(String),

    /// Fetched data could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The check returned a result that violates the result model
    #[error("Invalid result: {0}")]
    InvalidResult(String),

    /// The check panicked
    #[error("Check panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CheckError::Network(format!("request timed out: {}", err))
        } else {
            CheckError::Network(err.to_string())
        }
    }
}

/// Error returned by `AuditOrchestrator::run_audit`
#[derive(Debug, Error)]
pub enum AuditError {
    /// The target identity failed validation
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The orchestrator has no phase-one checks to run
    #[error("No checks registered for the audit")]
    NoChecksRegistered,

    /// Two registered checks share a module name
    #[error("Duplicate check module: {0}")]
    DuplicateModule(String),
}

/// Result type for audit orchestration
pub type AuditResult<T> = std::result::Result<T, AuditError>;
