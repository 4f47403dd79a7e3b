//! Per-repository status snapshot.

use std::path::Path;

use walkdir::WalkDir;
use wipctl_core::types::{Repository, RepositoryStatus};

use crate::context::OpContext;
use crate::error::GitError;
use crate::executor::Git;

/// Collect a fresh [`RepositoryStatus`] for `repo`.
///
/// Failures of the identity queries (branch, status, remote) produce a snapshot
/// with `error` set; the numeric extras degrade to zero on their own.
pub fn snapshot(ctx: &OpContext, repo: &Repository) -> RepositoryStatus {
    match collect(ctx, repo) {
        Ok(status) => status,
        Err(e) => {
            tracing::debug!(repo = %repo.name, error = %e, "status collection failed");
            RepositoryStatus::failed(repo, e.to_string())
        }
    }
}

fn collect(ctx: &OpContext, repo: &Repository) -> Result<RepositoryStatus, GitError> {
    let git = Git::new(ctx, &repo.path);
    let branch = git.current_branch()?;
    let entries = git.status_entries()?;
    let has_origin = git.has_origin()?;
    let git_dir = git.git_dir()?;
    let in_progress = git.in_progress()?;
    let (ahead, behind) = git.ahead_behind();
    let lines = git.line_stats();

    Ok(RepositoryStatus {
        path: repo.path.clone(),
        name: repo.name.0.clone(),
        branch,
        dirty: entries.iter().filter(|e| !e.is_untracked()).count(),
        untracked: git.untracked_files()?.len(),
        ahead,
        behind,
        has_origin,
        in_progress,
        lines_added: lines.added,
        lines_removed: lines.removed,
        files_changed: lines.files,
        commit_count: git.commit_count(),
        last_commit: git.last_subject(),
        size: dir_size(&git_dir)
            .map(format_size)
            .unwrap_or_else(|| "?".to_string()),
        error: None,
    })
}

/// Total size of regular files under `dir`; `None` if it cannot be walked.
pub fn dir_size(dir: &Path) -> Option<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.ok()?;
        if entry.file_type().is_file() {
            total += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    Some(total)
}

/// `du -h` style size: `512B`, `4.0K`, `1.3M`, `2.1G`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1}{}", UNITS[unit])
}
