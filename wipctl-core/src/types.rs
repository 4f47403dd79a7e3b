//! Domain types shared by every wipctl crate.
//!
//! All path fields use `PathBuf`. Every type here is a value: repositories are
//! created by discovery and never mutated, status snapshots are collected fresh
//! for each operation.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Display name of a repository (final path segment).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoName(pub String);

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for RepoName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A generated work-in-progress branch name.
///
/// Shape: `wip/<host>/<YYYYMMDD-HHMMSS>` or `wip/<host>/<feature>/<YYYYMMDD-HHMMSS>`.
/// The same name is used for the local branch and the branch on `origin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WipBranch(pub String);

/// Ref namespace holding every WIP branch.
pub const WIP_PREFIX: &str = "wip/";

impl WipBranch {
    /// Build the identifier for `host` (and optional `feature`) at instant `at`.
    ///
    /// Host and feature are reduced to ref-safe characters first.
    pub fn generate<Tz: TimeZone>(host: &str, feature: Option<&str>, at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let stamp = at.format("%Y%m%d-%H%M%S");
        let host = sanitize_segment(host);
        match feature.map(sanitize_segment) {
            Some(feature) => Self(format!("{WIP_PREFIX}{host}/{feature}/{stamp}")),
            None => Self(format!("{WIP_PREFIX}{host}/{stamp}")),
        }
    }

    /// Same identifier with a numeric disambiguation suffix (`-2`, `-3`, …).
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WipBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for WipBranch {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WipBranch {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` with `-`, collapse runs of dots,
/// drop trailing `.lock` and trim separators, leaving a valid ref component.
fn sanitize_segment(raw: &str) -> String {
    let mut segment: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    loop {
        while segment.contains("..") {
            segment = segment.replace("..", ".");
        }
        let trimmed = segment.trim_matches(|c| c == '-' || c == '.');
        match trimmed.strip_suffix(".lock") {
            Some(stripped) => segment = stripped.to_string(),
            None => {
                segment = trimmed.to_string();
                break;
            }
        }
    }
    if segment.is_empty() {
        "unknown".to_string()
    } else {
        segment
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// One Git working copy found under the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repository {
    /// Location of the working tree; unique within a run.
    pub path: PathBuf,
    pub name: RepoName,
}

impl Repository {
    /// Build a handle for `path`, deriving the display name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = RepoName(display_name(&path));
        Self { path, name }
    }
}

/// Derive the display name for a repository path.
///
/// - normal paths use their final segment;
/// - `.`/`..` resolve against the current directory first;
/// - a path with no final segment (e.g. `/`) is `root`;
/// - a name that is blank after trimming is `unknown`.
pub fn display_name(path: &Path) -> String {
    let segment = match path.file_name() {
        Some(name) => Some(name.to_string_lossy().into_owned()),
        None => std::fs::canonicalize(path)
            .ok()
            .and_then(|abs| abs.file_name().map(|n| n.to_string_lossy().into_owned())),
    };
    match segment {
        None => "root".to_string(),
        Some(name) if name == "/" || name.is_empty() => "root".to_string(),
        Some(name) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                "unknown".to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Status snapshot
// ---------------------------------------------------------------------------

/// Point-in-time status of one repository.
///
/// When `error` is set only `path` and `name` carry meaning; every other
/// field holds its default and must not be shown as authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    pub path: PathBuf,
    pub name: String,
    pub branch: String,
    pub dirty: usize,
    pub untracked: usize,
    pub ahead: usize,
    pub behind: usize,
    pub has_origin: bool,
    pub in_progress: bool,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub files_changed: usize,
    pub commit_count: usize,
    /// Last commit subject, truncated for display.
    pub last_commit: String,
    /// Human-formatted size of the git directory.
    pub size: String,
    pub error: Option<String>,
}

impl RepositoryStatus {
    /// Snapshot for a repository whose collection failed.
    pub fn failed(repo: &Repository, error: impl Into<String>) -> Self {
        Self {
            path: repo.path.clone(),
            name: repo.name.0.clone(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Summary classification used in tables and generator input.
    pub fn state(&self) -> RepoState {
        if self.error.is_some() {
            RepoState::Error
        } else if !self.has_origin {
            RepoState::NoOrigin
        } else if self.in_progress {
            RepoState::InProgress
        } else if self.dirty > 0 || self.untracked > 0 {
            RepoState::Dirty
        } else {
            RepoState::Clean
        }
    }
}

/// Coarse state of a repository snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepoState {
    Clean,
    Dirty,
    NoOrigin,
    InProgress,
    Error,
}

impl RepoState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoState::Clean => "clean",
            RepoState::Dirty => "dirty",
            RepoState::NoOrigin => "no-origin",
            RepoState::InProgress => "in-progress",
            RepoState::Error => "error",
        }
    }
}

impl fmt::Display for RepoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
