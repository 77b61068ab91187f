//! Check runner
//!
//! Spawns every check operation of a phase as its own tokio task and joins
//! them all. A failing, panicking or timed-out operation becomes a synthetic
//! failed `ModuleOutcome`; it never aborts or delays its siblings. Output
//! order always matches registration order.

use crate::category::Category;
use crate::error::CheckError;
use crate::target::TargetContext;
use crate::types::{
    CheckOperation, CheckOutcome, DependentCheckOperation, ModuleOutcome, Phase, PriorResults,
};
use futures::future::{join_all, BoxFuture};
use std::any::Any;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, warn};

struct PendingCheck {
    module: String,
    category: Category,
    task: Option<BoxFuture<'static, Result<CheckOutcome, CheckError>>>,
}

/// Run independent checks concurrently
pub async fn run_checks(
    checks: &[Arc<dyn CheckOperation>],
    target: Arc<TargetContext>,
    deadline: Option<Instant>,
) -> Vec<ModuleOutcome> {
    let pending = checks
        .iter()
        .map(|check| {
            let module = check.name().to_string();
            let category = check.category();
            let task = if check.is_available() {
                let check = Arc::clone(check);
                let target = Arc::clone(&target);
                let fut: BoxFuture<'static, _> = Box::pin(async move { check.run(&target).await });
                Some(fut)
            } else {
                None
            };
            PendingCheck { module, category, task }
        })
        .collect();

    run_pending(pending, Phase::Independent, deadline).await
}

/// Run checks that consume phase-one results
pub async fn run_dependent_checks(
    checks: &[Arc<dyn DependentCheckOperation>],
    target: Arc<TargetContext>,
    prior: Arc<PriorResults>,
    deadline: Option<Instant>,
) -> Vec<ModuleOutcome> {
    let pending = checks
        .iter()
        .map(|check| {
            let module = check.name().to_string();
            let category = check.category();
            let task = if check.is_available() {
                let check = Arc::clone(check);
                let target = Arc::clone(&target);
                let prior = Arc::clone(&prior);
                let fut: BoxFuture<'static, _> =
                    Box::pin(async move { check.run(&target, &prior).await });
                Some(fut)
            } else {
                None
            };
            PendingCheck { module, category, task }
        })
        .collect();

    run_pending(pending, Phase::Dependent, deadline).await
}

async fn run_pending(
    pending: Vec<PendingCheck>,
    phase: Phase,
    deadline: Option<Instant>,
) -> Vec<ModuleOutcome> {
    let started = Instant::now();

    // Spawn everything before awaiting anything so the tasks run in parallel
    let spawned: Vec<_> = pending
        .into_iter()
        .map(|p| {
            let handle = match p.task {
                Some(task) if !deadline_passed(deadline) => Ok(tokio::spawn(task)),
                Some(_) => Err(CheckError::Timeout),
                None => Err(CheckError::Unavailable(format!(
                    "{} prerequisites are not configured",
                    p.module
                ))),
            };
            (p.module, p.category, handle)
        })
        .collect();

    let joined = join_all(spawned.into_iter().map(|(module, category, handle)| async move {
        let result = match handle {
            Ok(handle) => await_check(handle, deadline).await,
            Err(err) => Err(err),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        into_module_outcome(module, category, phase, result, elapsed_ms)
    }))
    .await;

    debug!(
        phase = ?phase,
        modules = joined.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Check phase joined"
    );

    joined
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.map_or(false, |d| Instant::now() >= d)
}

async fn await_check(
    mut handle: JoinHandle<Result<CheckOutcome, CheckError>>,
    deadline: Option<Instant>,
) -> Result<CheckOutcome, CheckError> {
    let joined = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                return Err(CheckError::Timeout);
            }
        },
        None => handle.await,
    };

    joined.map_err(join_error_to_check_error)?
}

fn join_error_to_check_error(err: JoinError) -> CheckError {
    if err.is_panic() {
        CheckError::Panicked(panic_message(err.into_panic()))
    } else {
        CheckError::Failed(err.to_string())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn into_module_outcome(
    module: String,
    category: Category,
    phase: Phase,
    result: Result<CheckOutcome, CheckError>,
    elapsed_ms: u64,
) -> ModuleOutcome {
    match result.and_then(|outcome| outcome.validate().map(|_| outcome)) {
        Ok(outcome) => {
            debug!(
                module = %module,
                checks = outcome.checks.len(),
                issues = outcome.issues.len(),
                elapsed_ms,
                "Check completed"
            );
            ModuleOutcome::completed(module, category, phase, outcome, elapsed_ms)
        }
        Err(err) => {
            warn!(module = %module, error = %err, elapsed_ms, "Check failed, recording as Fail");
            ModuleOutcome::failed(module, category, phase, &err, elapsed_ms)
        }
    }
}
