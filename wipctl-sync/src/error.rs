//! Error types for wipctl-sync.

use std::path::PathBuf;

use thiserror::Error;

use wipctl_core::ConfigError;
use wipctl_discover::DiscoverError;
use wipctl_git::GitError;
use wipctl_renderer::RenderError;

/// Errors that abort a whole workspace run.
///
/// Per-repository failures never surface here; they become report entries.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("discovery failed: {0}")]
    Discover(#[from] DiscoverError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Raised only for workspace-level setup such as the junk guard.
    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
