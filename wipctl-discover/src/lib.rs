//! Repository discovery for `wipctl-discover`.
//!
//! `discover(root)` walks the workspace and returns every directory that is
//! the top of a Git working copy: it holds a `.git` directory, or a `.git`
//! file starting with `gitdir: ` (worktrees, submodules). Walking never enters
//! a `.git` directory. The result is sorted by path.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;
use wipctl_core::types::Repository;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors from discovery. Every variant aborts the whole run.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("workspace walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const GITDIR_MARKER: &[u8] = b"gitdir: ";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find every Git working copy under `root` (including `root` itself).
pub fn discover(root: &Path) -> Result<Vec<Repository>, DiscoverError> {
    let mut found: Vec<PathBuf> = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if is_working_copy(entry.path())? {
            found.push(entry.into_path());
        }
    }

    found.sort();
    tracing::debug!(root = %root.display(), repos = found.len(), "discovery finished");
    Ok(found.into_iter().map(Repository::new).collect())
}

/// Whether `dir` is the top of a Git working copy.
pub fn is_working_copy(dir: &Path) -> Result<bool, DiscoverError> {
    let marker = dir.join(".git");
    let meta = match fs::symlink_metadata(&marker) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(DiscoverError::Io { path: marker, source: e }),
    };
    if meta.is_dir() {
        return Ok(true);
    }
    if !meta.is_file() {
        return Ok(false);
    }

    let mut head = [0u8; 8];
    let mut file = fs::File::open(&marker).map_err(|e| DiscoverError::Io {
        path: marker.clone(),
        source: e,
    })?;
    let mut read = 0;
    while read < head.len() {
        let n = file
            .read(&mut head[read..])
            .map_err(|e| DiscoverError::Io { path: marker.clone(), source: e })?;
        if n == 0 {
            break;
        }
        read += n;
    }
    Ok(&head[..read] == GITDIR_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn short_git_file_is_not_a_repository() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".git"), "git").unwrap();
        assert!(!is_working_copy(dir.path()).unwrap());
    }

    #[test]
    fn plain_directory_is_not_a_repository() {
        let dir = TempDir::new().unwrap();
        assert!(!is_working_copy(dir.path()).unwrap());
    }
}
