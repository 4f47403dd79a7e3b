//! Concurrent status collection.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use wipctl_core::types::{Repository, RepositoryStatus};
use wipctl_git::{status, OpContext};

use crate::coordinator::runtime;
use crate::error::SyncError;

/// Snapshot every repository, at most `concurrency` at a time.
///
/// The result is sorted by name, then path. A repository whose collection
/// fails still appears, with `error` set.
pub async fn collect(
    ctx: &OpContext,
    repos: Vec<Repository>,
    concurrency: usize,
) -> Vec<RepositoryStatus> {
    let slots = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut units = JoinSet::new();

    for repo in repos {
        let slots = slots.clone();
        let ctx = ctx.clone();
        units.spawn(async move {
            let _permit = slots.acquire_owned().await.ok()?;
            if ctx.is_done() {
                return None;
            }
            let fallback = repo.clone();
            match tokio::task::spawn_blocking(move || status::snapshot(&ctx, &repo)).await {
                Ok(snapshot) => Some(snapshot),
                Err(err) => Some(RepositoryStatus::failed(&fallback, err.to_string())),
            }
        });
    }

    let mut statuses = Vec::new();
    while let Some(joined) = units.join_next().await {
        match joined {
            Ok(Some(snapshot)) => statuses.push(snapshot),
            Ok(None) => {}
            Err(err) => tracing::error!(error = %err, "status unit failed"),
        }
    }
    statuses.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    statuses
}

/// [`collect`] for synchronous callers.
pub fn collect_blocking(
    ctx: &OpContext,
    repos: Vec<Repository>,
    concurrency: usize,
) -> Result<Vec<RepositoryStatus>, SyncError> {
    Ok(runtime()?.block_on(collect(ctx, repos, concurrency)))
}
