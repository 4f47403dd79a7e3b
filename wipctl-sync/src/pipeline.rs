//! Workspace-level entry points used by the CLI.
//!
//! Each operation discovers repositories under the configured root, fans the
//! per-repository machine out through the coordinator and returns the
//! finished [`Report`]. Saving the report is left to the caller.

use std::sync::Arc;

use wipctl_core::config::WorkspaceConfig;
use wipctl_core::report::{Operation, Report, ReportEntry};
use wipctl_core::types::{Repository, RepositoryStatus};
use wipctl_git::{JunkGuard, OpContext};

use crate::checkpoint::CheckpointHandler;
use crate::collector;
use crate::coordinator::{self, Observer};
use crate::error::SyncError;
use crate::pull::PullHandler;
use crate::push::PushHandler;

/// Every working copy under the workspace root, sorted by path.
pub fn discover(config: &WorkspaceConfig) -> Result<Vec<Repository>, SyncError> {
    let repos = wipctl_discover::discover(&config.root)?;
    tracing::info!(root = %config.root.display(), count = repos.len(), "discovered repositories");
    Ok(repos)
}

/// Junk guard with the configured extra patterns.
pub fn junk_guard(config: &WorkspaceConfig) -> Result<JunkGuard, SyncError> {
    Ok(JunkGuard::new(&config.settings.junk_patterns)?)
}

pub fn status(
    config: &WorkspaceConfig,
    ctx: &OpContext,
    concurrency: usize,
) -> Result<Vec<RepositoryStatus>, SyncError> {
    let repos = discover(config)?;
    collector::collect_blocking(ctx, repos, concurrency)
}

pub fn push(
    config: &WorkspaceConfig,
    ctx: &OpContext,
    concurrency: usize,
    handler: PushHandler,
    observer: Option<Observer>,
) -> Result<Report, SyncError> {
    let repos = discover(config)?;
    let report = Report::new(Operation::Push, &config.root, ctx.dry_run);
    coordinator::run_blocking(ctx.clone(), repos, concurrency, Arc::new(handler), report, observer)
}

pub fn pull(
    config: &WorkspaceConfig,
    ctx: &OpContext,
    concurrency: usize,
    observer: Option<Observer>,
) -> Result<Report, SyncError> {
    let repos = discover(config)?;
    let report = Report::new(Operation::Pull, &config.root, ctx.dry_run);
    coordinator::run_blocking(ctx.clone(), repos, concurrency, Arc::new(PullHandler), report, observer)
}

/// Checkpoint every repository with local changes or unpushed commits.
///
/// Clean repositories are not part of the report. Repositories whose status
/// could not be read get an `error` entry. The workspace summary counts every
/// discovered repository.
pub fn checkpoint(
    config: &WorkspaceConfig,
    ctx: &OpContext,
    concurrency: usize,
    handler: CheckpointHandler,
    observer: Option<Observer>,
) -> Result<Report, SyncError> {
    let repos = discover(config)?;
    let total = repos.len();
    let statuses = collector::collect_blocking(ctx, repos, concurrency)?;

    let options = handler.options();
    let mut report = Report::new(Operation::Checkpoint, &config.root, ctx.dry_run)
        .with_feature(options.feature.clone(), options.cross_repo);

    let mut candidates = Vec::new();
    for status in statuses {
        if let Some(err) = status.error.as_deref() {
            let entry = ReportEntry::error(status.name.clone(), format!("status check failed: {err}"));
            if let Some(observe) = observer.as_ref() {
                observe(&entry);
            }
            report.push(entry);
        } else if status.dirty + status.untracked > 0 || status.ahead > 0 {
            candidates.push(Repository::new(status.path));
        } else {
            tracing::debug!(repo = %status.name, "clean; nothing to checkpoint");
        }
    }

    let mut report =
        coordinator::run_blocking(ctx.clone(), candidates, concurrency, Arc::new(handler), report, observer)?;
    report.summarize(total);
    Ok(report)
}
