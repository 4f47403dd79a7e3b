//! Git operation executor for a single repository.
//!
//! # Dry-run contract
//!
//! Every mutating verb is a [`Mutation`]. Its argument vector is built once
//! by [`Mutation::args`]; [`Git::apply`] then either describes that exact
//! vector (dry-run) or executes it. Read-only verbs always execute.
//!
//! # Error policy
//!
//! Non-zero exits become [`GitError::Failed`]. Numeric queries (ahead/behind,
//! line stats, commit count) swallow errors and report zero.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::context::OpContext;
use crate::error::GitError;
use crate::parse::{self, LineStats, PorcelainEntry};
use crate::runner::{run_git, GitOutput};

/// Remote every verb talks to.
pub const ORIGIN: &str = "origin";
/// Remote-tracking namespace of WIP branches on `origin`.
pub const REMOTE_WIP_REFS: &str = "refs/remotes/origin/wip/";
const REMOTE_REFS_PREFIX: &str = "refs/remotes/origin/";

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// A state-changing git command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// `git fetch --prune --quiet origin`
    Fetch,
    /// `git add -A`
    AddAll,
    /// `git commit --allow-empty -m <message>`
    CommitAllowEmpty { message: String },
    /// `git switch <branch>`
    Switch { branch: String },
    /// `git switch -C <branch>` (create or reset)
    SwitchCreate { branch: String },
    /// `git switch -c <branch> --track origin/<branch>`
    SwitchCreateTracking { branch: String },
    /// `git push origin <branch>`
    Push { branch: String },
    /// `git push -u origin <branch>`
    PushUpstream { branch: String },
    /// `git stash push -u -m <message>`
    Stash { message: String },
    /// `git stash pop`
    StashPop,
}

impl Mutation {
    /// Argument vector passed to `git`.
    pub fn args(&self) -> Vec<String> {
        match self {
            Mutation::Fetch => strings(&["fetch", "--prune", "--quiet", ORIGIN]),
            Mutation::AddAll => strings(&["add", "-A"]),
            Mutation::CommitAllowEmpty { message } => {
                strings(&["commit", "--allow-empty", "-m", message.as_str()])
            }
            Mutation::Switch { branch } => strings(&["switch", branch.as_str()]),
            Mutation::SwitchCreate { branch } => strings(&["switch", "-C", branch.as_str()]),
            Mutation::SwitchCreateTracking { branch } => {
                let upstream = format!("{ORIGIN}/{branch}");
                strings(&["switch", "-c", branch.as_str(), "--track", upstream.as_str()])
            }
            Mutation::Push { branch } => strings(&["push", ORIGIN, branch.as_str()]),
            Mutation::PushUpstream { branch } => strings(&["push", "-u", ORIGIN, branch.as_str()]),
            Mutation::Stash { message } => strings(&["stash", "push", "-u", "-m", message.as_str()]),
            Mutation::StashPop => strings(&["stash", "pop"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl fmt::Display for Mutation {
    /// Shell-style rendering, e.g. `git commit --allow-empty -m "wip: x"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("git")?;
        for arg in self.args() {
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Result of applying a [`Mutation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The command ran and exited zero.
    Applied,
    /// Dry-run: `would run: git …`; nothing was executed.
    Described(String),
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

/// Whether a repository may take part in push/pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preconditions {
    pub eligible: bool,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

/// Executor bound to one repository and one operation context.
#[derive(Debug, Clone, Copy)]
pub struct Git<'a> {
    ctx: &'a OpContext,
    repo: &'a Path,
}

impl<'a> Git<'a> {
    pub fn new(ctx: &'a OpContext, repo: &'a Path) -> Self {
        Self { ctx, repo }
    }

    pub fn repo(&self) -> &Path {
        self.repo
    }

    fn run(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        run_git(self.ctx, self.repo, &strings(args))
    }

    fn read(&self, args: &[&str]) -> Result<String, GitError> {
        Ok(self.run(args)?.stdout)
    }

    /// `Ok(false)` when git exits non-zero, errors only for spawn/interrupt.
    fn probe(&self, args: &[&str]) -> Result<bool, GitError> {
        match self.run(args) {
            Ok(_) => Ok(true),
            Err(GitError::Failed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // -- mutating ------------------------------------------------------------

    /// Execute `m`, or under dry-run only describe it.
    pub fn apply(&self, m: &Mutation) -> Result<Effect, GitError> {
        if self.ctx.dry_run {
            let description = format!("would run: {m}");
            tracing::info!(repo = %self.repo.display(), "[dry-run] {description}");
            return Ok(Effect::Described(description));
        }
        run_git(self.ctx, self.repo, &m.args())?;
        Ok(Effect::Applied)
    }

    pub fn fetch(&self) -> Result<Effect, GitError> {
        self.apply(&Mutation::Fetch)
    }

    pub fn add_all(&self) -> Result<Effect, GitError> {
        self.apply(&Mutation::AddAll)
    }

    pub fn commit_allow_empty(&self, message: &str) -> Result<Effect, GitError> {
        self.apply(&Mutation::CommitAllowEmpty {
            message: message.to_string(),
        })
    }

    pub fn switch(&self, branch: &str) -> Result<Effect, GitError> {
        self.apply(&Mutation::Switch {
            branch: branch.to_string(),
        })
    }

    pub fn switch_create(&self, branch: &str) -> Result<Effect, GitError> {
        self.apply(&Mutation::SwitchCreate {
            branch: branch.to_string(),
        })
    }

    pub fn switch_create_tracking(&self, branch: &str) -> Result<Effect, GitError> {
        self.apply(&Mutation::SwitchCreateTracking {
            branch: branch.to_string(),
        })
    }

    pub fn push(&self, branch: &str) -> Result<Effect, GitError> {
        self.apply(&Mutation::Push {
            branch: branch.to_string(),
        })
    }

    pub fn push_with_upstream(&self, branch: &str) -> Result<Effect, GitError> {
        self.apply(&Mutation::PushUpstream {
            branch: branch.to_string(),
        })
    }

    pub fn stash(&self, message: &str) -> Result<Effect, GitError> {
        self.apply(&Mutation::Stash {
            message: message.to_string(),
        })
    }

    pub fn stash_pop(&self) -> Result<Effect, GitError> {
        self.apply(&Mutation::StashPop)
    }

    // -- read-only -----------------------------------------------------------

    /// Checked-out branch; `HEAD` when detached. Works on unborn branches.
    pub fn current_branch(&self) -> Result<String, GitError> {
        match self.read(&["rev-parse", "--abbrev-ref", "HEAD"]) {
            Ok(out) => Ok(out.trim().to_string()),
            Err(GitError::Failed { .. }) => {
                Ok(self.read(&["symbolic-ref", "--short", "HEAD"])?.trim().to_string())
            }
            Err(e) => Err(e),
        }
    }

    pub fn has_origin(&self) -> Result<bool, GitError> {
        self.probe(&["remote", "get-url", ORIGIN])
    }

    /// Absolute path of the git directory (handles worktrees and submodules).
    pub fn git_dir(&self) -> Result<PathBuf, GitError> {
        let raw = self.read(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(raw.trim()))
    }

    /// Rebase or merge in flight.
    pub fn in_progress(&self) -> Result<bool, GitError> {
        let dir = self.git_dir()?;
        Ok(["rebase-apply", "rebase-merge", "MERGE_HEAD"]
            .iter()
            .any(|marker| dir.join(marker).exists()))
    }

    /// Eligibility gate for push/pull/checkpoint.
    pub fn preconditions(&self) -> Result<Preconditions, GitError> {
        if !self.has_origin()? {
            return Ok(Preconditions {
                eligible: false,
                reason: "no origin remote".to_string(),
            });
        }
        if self.in_progress()? {
            return Ok(Preconditions {
                eligible: false,
                reason: "rebase/merge in progress".to_string(),
            });
        }
        Ok(Preconditions {
            eligible: true,
            reason: "ok".to_string(),
        })
    }

    /// Raw `git status --porcelain`.
    pub fn porcelain(&self) -> Result<String, GitError> {
        self.read(&["status", "--porcelain"])
    }

    pub fn status_entries(&self) -> Result<Vec<PorcelainEntry>, GitError> {
        Ok(parse::parse_porcelain(&self.porcelain()?))
    }

    /// Tracked files with changes (untracked excluded).
    pub fn dirty_count(&self) -> Result<usize, GitError> {
        Ok(self
            .status_entries()?
            .iter()
            .filter(|e| !e.is_untracked())
            .count())
    }

    /// Every untracked, non-ignored file (directories expanded).
    pub fn untracked_files(&self) -> Result<Vec<String>, GitError> {
        Ok(parse::parse_lines(
            &self.read(&["ls-files", "--others", "--exclude-standard"])?,
        ))
    }

    /// `(ahead, behind)` relative to the upstream; `(0, 0)` without one.
    pub fn ahead_behind(&self) -> (usize, usize) {
        self.read(&["rev-list", "--left-right", "--count", "@{u}...HEAD"])
            .map(|out| parse::parse_ahead_behind(&out))
            .unwrap_or((0, 0))
    }

    /// Working tree line deltas against `HEAD`.
    pub fn line_stats(&self) -> LineStats {
        self.read(&["diff", "--numstat", "HEAD"])
            .map(|out| parse::parse_numstat(&out))
            .unwrap_or_default()
    }

    pub fn commit_count(&self) -> usize {
        self.read(&["rev-list", "--count", "HEAD"])
            .map(|out| parse::parse_count(&out))
            .unwrap_or(0)
    }

    /// Last commit subject, truncated; empty on an unborn branch.
    pub fn last_subject(&self) -> String {
        self.read(&["log", "-1", "--pretty=format:%s"])
            .map(|out| parse::truncate_subject(&out))
            .unwrap_or_default()
    }

    /// Up to `n` most recent subjects, newest first; empty on an unborn branch.
    pub fn recent_subjects(&self, n: usize) -> Vec<String> {
        let count = format!("-n{n}");
        self.read(&["log", &count, "--pretty=format:%s"])
            .map(|out| parse::parse_lines(&out))
            .unwrap_or_default()
    }

    pub fn staged_name_status(&self) -> Result<String, GitError> {
        self.read(&["diff", "--cached", "--name-status"])
    }

    pub fn staged_diff_stat(&self) -> Result<String, GitError> {
        self.read(&["diff", "--cached", "--stat"])
    }

    pub fn worktree_name_status(&self) -> Result<String, GitError> {
        self.read(&["diff", "--name-status", "HEAD"])
    }

    pub fn worktree_diff_stat(&self) -> Result<String, GitError> {
        self.read(&["diff", "--stat", "HEAD"])
    }

    /// Paths with unresolved merge conflicts.
    pub fn conflict_files(&self) -> Result<Vec<String>, GitError> {
        Ok(parse::parse_lines(
            &self.read(&["diff", "--name-only", "--diff-filter=U"])?,
        ))
    }

    /// Whether `origin` has `refs/heads/<branch>` (asks the remote).
    pub fn remote_has_branch(&self, branch: &str) -> Result<bool, GitError> {
        let out = self.read(&["ls-remote", "--heads", ORIGIN, branch])?;
        Ok(!out.trim().is_empty())
    }

    pub fn local_branch_exists(&self, branch: &str) -> Result<bool, GitError> {
        let r = format!("refs/heads/{branch}");
        self.probe(&["rev-parse", "--verify", "--quiet", &r])
    }

    pub fn remote_tracking_exists(&self, branch: &str) -> Result<bool, GitError> {
        let r = format!("{REMOTE_REFS_PREFIX}{branch}");
        self.probe(&["rev-parse", "--verify", "--quiet", &r])
    }

    /// Most recent `origin` WIP branch by committer time, without the
    /// `refs/remotes/origin/` prefix.
    pub fn latest_remote_wip(&self) -> Result<Option<String>, GitError> {
        let out = self.read(&[
            "for-each-ref",
            "--format=%(committerdate:iso-strict) %(refname)",
            REMOTE_WIP_REFS,
        ])?;
        Ok(parse::latest_ref(&out, REMOTE_REFS_PREFIX))
    }

    /// Object id of `refs/stash`, if any stash exists.
    pub fn stash_ref(&self) -> Result<Option<String>, GitError> {
        match self.run(&["rev-parse", "--verify", "--quiet", "refs/stash"]) {
            Ok(out) => Ok(Some(out.stdout.trim().to_string())),
            Err(GitError::Failed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn head_hash(&self) -> Result<String, GitError> {
        Ok(self.read(&["rev-parse", "HEAD"])?.trim().to_string())
    }
}
