//! Generator inputs for `status --ai` and `review`.

use wipctl_ai::{RepoBriefingInput, WorkspaceContextInput, WorkspaceRepo};
use wipctl_core::types::{Repository, RepositoryStatus};
use wipctl_git::{Git, GitError, OpContext};

/// Subjects per repository in workspace briefings.
pub const WORKSPACE_RECENT: usize = 5;
/// Subjects in a single-repository briefing.
pub const REPO_RECENT: usize = 10;

/// Synopsis input built from snapshots alone; no further git calls.
///
/// Snapshots with an error are left out.
pub fn synopsis_input(statuses: &[RepositoryStatus]) -> WorkspaceContextInput {
    let repos = statuses
        .iter()
        .filter(|s| s.error.is_none())
        .map(|s| WorkspaceRepo {
            recent_work: Some(s.last_commit.clone())
                .filter(|subject| !subject.is_empty())
                .into_iter()
                .collect(),
            ..summary(s)
        })
        .collect();
    WorkspaceContextInput::from_repos(repos)
}

/// Workspace briefing: snapshots plus recent subjects and current changes.
pub fn workspace_input(ctx: &OpContext, statuses: &[RepositoryStatus]) -> WorkspaceContextInput {
    let repos = statuses
        .iter()
        .filter(|s| s.error.is_none())
        .map(|s| {
            let git = Git::new(ctx, &s.path);
            WorkspaceRepo {
                recent_work: git.recent_subjects(WORKSPACE_RECENT),
                changes: git.worktree_name_status().unwrap_or_default(),
                ..summary(s)
            }
        })
        .collect();
    WorkspaceContextInput::from_repos(repos)
}

/// Briefing input for one repository.
pub fn repo_input(ctx: &OpContext, repo: &Repository) -> Result<RepoBriefingInput, GitError> {
    let git = Git::new(ctx, &repo.path);
    let branch = git.current_branch()?;
    let lines = git.line_stats();
    Ok(RepoBriefingInput {
        repo: repo.name.0.clone(),
        branch,
        diff_stat: git.worktree_diff_stat().unwrap_or_default(),
        name_status: git.worktree_name_status().unwrap_or_default(),
        commit_messages: git.recent_subjects(REPO_RECENT),
        files_count: lines.files,
        lines_added: lines.added,
        lines_removed: lines.removed,
    })
}

fn summary(status: &RepositoryStatus) -> WorkspaceRepo {
    WorkspaceRepo {
        name: status.name.clone(),
        branch: status.branch.clone(),
        status: status.state().as_str().to_string(),
        files_changed: status.files_changed,
        lines_added: status.lines_added,
        lines_removed: status.lines_removed,
        commits: status.commit_count,
        recent_work: Vec::new(),
        changes: String::new(),
    }
}
