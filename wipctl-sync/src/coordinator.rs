//! Bounded-concurrency fan-out over repositories.
//!
//! Each repository becomes one unit. A unit waits for a semaphore slot, runs
//! its handler on the blocking pool and appends the finished entry to the
//! shared [`Report`]. The lock is held only for the append.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use wipctl_core::report::{Report, ReportEntry};
use wipctl_core::types::Repository;
use wipctl_git::OpContext;

use crate::error::{io_err, SyncError};

/// Per-repository state machine.
pub trait RepoHandler: Send + Sync {
    /// Drive one repository to a finished entry. Must not panic; if it does,
    /// the coordinator records an `error` entry for the repository.
    fn process(&self, ctx: &OpContext, repo: &Repository) -> ReportEntry;
}

/// Called with every entry as soon as it is appended.
pub type Observer = Arc<dyn Fn(&ReportEntry) + Send + Sync>;

/// Run `handler` over `repos` with at most `concurrency` units in flight.
///
/// Units that have not started when `ctx` is cancelled (or its deadline has
/// passed) produce no entry, and neither do units that were running at that
/// moment and had a git command refused or killed. A repository missing from
/// the report did not complete. Entries are sorted by repository name before
/// the report is returned.
pub async fn run(
    ctx: OpContext,
    repos: Vec<Repository>,
    concurrency: usize,
    handler: Arc<dyn RepoHandler>,
    report: Report,
    observer: Option<Observer>,
) -> Report {
    let slots = Arc::new(Semaphore::new(concurrency.max(1)));
    let shared = Arc::new(Mutex::new(report));
    let mut units = JoinSet::new();

    for repo in repos {
        let slots = slots.clone();
        let shared = shared.clone();
        let handler = handler.clone();
        let observer = observer.clone();
        let ctx = ctx.clone();

        units.spawn(async move {
            let Ok(_permit) = slots.acquire_owned().await else {
                return;
            };
            if ctx.is_done() {
                tracing::debug!(repo = %repo.name, "not started: operation interrupted");
                return;
            }

            let name = repo.name.0.clone();
            let unit = ctx.unit();
            let worker = unit.clone();
            let joined = tokio::task::spawn_blocking(move || handler.process(&worker, &repo)).await;
            let entry = match joined {
                Ok(_) if unit.was_interrupted() => {
                    tracing::debug!(repo = %name, "interrupted while running; no entry");
                    return;
                }
                Ok(entry) => entry,
                Err(err) if err.is_panic() => {
                    let message = panic_message(err.into_panic());
                    tracing::error!(repo = %name, panic = %message, "handler panicked");
                    ReportEntry::error(name, format!("handler panicked: {message}"))
                }
                Err(err) => ReportEntry::error(name, format!("handler aborted: {err}")),
            };

            shared.lock().await.push(entry.clone());
            if let Some(observe) = observer.as_ref() {
                observe(&entry);
            }
        });
    }

    while let Some(joined) = units.join_next().await {
        if let Err(err) = joined {
            tracing::error!(error = %err, "coordinator unit failed");
        }
    }

    let mut report = match Arc::try_unwrap(shared) {
        Ok(mutex) => mutex.into_inner(),
        Err(shared) => shared.lock().await.clone(),
    };
    report.sort_entries();
    report
}

/// [`run`] on a fresh multi-threaded runtime, for synchronous callers.
pub fn run_blocking(
    ctx: OpContext,
    repos: Vec<Repository>,
    concurrency: usize,
    handler: Arc<dyn RepoHandler>,
    report: Report,
    observer: Option<Observer>,
) -> Result<Report, SyncError> {
    let runtime = runtime()?;
    Ok(runtime.block_on(run(ctx, repos, concurrency, handler, report, observer)))
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, SyncError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
