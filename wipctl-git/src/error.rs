//! Error types for wipctl-git.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from running `git` for one repository.
#[derive(Debug, Error)]
pub enum GitError {
    /// `git` could not be started at all.
    #[error("failed to start git in {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `git` ran and exited non-zero.
    #[error("git {args} failed{}: {stderr}", exit_suffix(.code))]
    Failed {
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The operation was cancelled while (or before) `git` ran.
    #[error("git {args} cancelled")]
    Cancelled { args: String },

    /// The operation deadline passed while (or before) `git` ran.
    #[error("git {args} exceeded the operation deadline")]
    DeadlineExceeded { args: String },

    /// I/O failure while waiting on or reading from `git`.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A junk-pattern expression failed to compile.
    #[error("invalid junk pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl GitError {
    /// True for cancellation and deadline expiry.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, GitError::Cancelled { .. } | GitError::DeadlineExceeded { .. })
    }
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" (exit {c})")).unwrap_or_default()
}

/// Convenience constructor for [`GitError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitError {
    GitError::Io {
        path: path.into(),
        source,
    }
}
