//! Structured inputs handed to generators. Field names are the JSON wire
//! names seen by external providers.

use serde::{Deserialize, Serialize};

/// Context for a commit message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMsgInput {
    pub repo: String,
    pub branch: String,
    pub host: String,
    pub name_status: String,
    pub diff_stat: String,
    pub untracked: Vec<String>,
    pub prior_subjects: Vec<String>,
}

/// Briefing request for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoBriefingInput {
    pub repo: String,
    pub branch: String,
    pub diff_stat: String,
    pub name_status: String,
    pub commit_messages: Vec<String>,
    pub files_count: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

/// One repository inside a workspace synopsis or briefing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRepo {
    pub name: String,
    pub branch: String,
    /// `clean`, `dirty`, `no-origin`, `in-progress` or `error`.
    pub status: String,
    pub files_changed: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub commits: usize,
    /// Recent commit subjects.
    pub recent_work: Vec<String>,
    /// Current name-status of the working tree.
    pub changes: String,
}

/// Workspace-wide synopsis or briefing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceContextInput {
    pub repositories: Vec<WorkspaceRepo>,
    pub total_files: usize,
    pub total_lines: usize,
    pub total_commits: usize,
    pub active_repos: usize,
    pub dirty_repos: usize,
}

impl WorkspaceContextInput {
    /// Build the totals from per-repository summaries.
    pub fn from_repos(repositories: Vec<WorkspaceRepo>) -> Self {
        let mut input = WorkspaceContextInput::default();
        for repo in &repositories {
            input.total_files += repo.files_changed;
            input.total_lines += repo.lines_added + repo.lines_removed;
            input.total_commits += repo.commits;
            if repo.files_changed > 0 || repo.commits > 0 {
                input.active_repos += 1;
            }
            if repo.status == "dirty" {
                input.dirty_repos += 1;
            }
        }
        input.repositories = repositories;
        input
    }
}

/// Any generator input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationInput {
    Commit(CommitMsgInput),
    Repo(RepoBriefingInput),
    Workspace(WorkspaceContextInput),
}
