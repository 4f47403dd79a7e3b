//! Report persistence.
//!
//! A report is rendered once and written once: content goes to a hidden
//! `.tmp` file first and is linked into place under the first free name, so
//! readers never see a partial file. Existing reports are never overwritten,
//! even by a concurrent run claiming the same name.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use wipctl_core::report::Report;
use wipctl_git::status::format_size;
use wipctl_renderer::ReportRenderer;

use crate::error::{io_err, SyncError};

/// Render `report` and store it under `dir`. Returns the written path.
pub fn save_report_at(
    dir: &Path,
    report: &Report,
    renderer: &ReportRenderer,
) -> Result<PathBuf, SyncError> {
    let content = renderer.render(report)?;
    fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let name = report.file_name();
    let tmp = dir.join(format!(".{name}.{}.{}.tmp", std::process::id(), next_tmp_id()));
    fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    let claimed = claim(&tmp, dir, &name);
    let _ = fs::remove_file(&tmp);
    let path = claimed?;

    tracing::info!(path = %path.display(), "report saved");
    Ok(path)
}

fn next_tmp_id() -> usize {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// Move the finished `tmp` onto the first free candidate name. Claiming is
/// atomic: a hard link (or, where links are unavailable, a `create_new`
/// placeholder) fails instead of replacing a file that already exists.
fn claim(tmp: &Path, dir: &Path, name: &str) -> Result<PathBuf, SyncError> {
    for candidate in candidates(dir, name) {
        match fs::hard_link(tmp, &candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                tracing::debug!(error = %e, "hard link unavailable; reserving name");
            }
        }
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => {
                fs::rename(tmp, &candidate).map_err(|e| io_err(&candidate, e))?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(io_err(&candidate, e)),
        }
    }
    Err(io_err(
        dir,
        std::io::Error::new(ErrorKind::AlreadyExists, format!("no free name for {name}")),
    ))
}

/// `name`, then `name` with `-2`, `-3`, … before the extension.
fn candidates<'a>(dir: &'a Path, name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
    let stem = name.strip_suffix(".md").unwrap_or(name);
    std::iter::once(dir.join(name)).chain((2..).map(move |n| dir.join(format!("{stem}-{n}.md"))))
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// A stored report file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub name: String,
    pub path: PathBuf,
    /// `push`, `pull`, `checkpoint`, or `unknown`.
    pub operation: String,
    pub modified: SystemTime,
    pub size: u64,
}

impl ReportFile {
    /// Age relative to now, e.g. `5m`.
    pub fn age(&self) -> String {
        let elapsed = SystemTime::now()
            .duration_since(self.modified)
            .unwrap_or_default();
        format_seconds(elapsed.as_secs())
    }

    pub fn size_label(&self) -> String {
        format_size(self.size)
    }
}

/// Every `wip-*.md` under `dir`, newest first. A missing directory is empty.
pub fn list_reports_at(dir: &Path) -> Result<Vec<ReportFile>, SyncError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut reports = Vec::new();
    for item in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let item = item.map_err(|e| io_err(dir, e))?;
        let name = item.file_name().to_string_lossy().to_string();
        if !(name.starts_with("wip-") && name.ends_with(".md")) {
            continue;
        }
        let meta = item.metadata().map_err(|e| io_err(item.path(), e))?;
        if !meta.is_file() {
            continue;
        }
        reports.push(ReportFile {
            operation: operation_of(&name),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            size: meta.len(),
            path: item.path(),
            name,
        });
    }
    reports.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    Ok(reports)
}

/// Resolve a `--show` argument: absolute paths as given, bare names in `dir`.
pub fn resolve_report_path(dir: &Path, file: &str) -> PathBuf {
    let candidate = Path::new(file);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        dir.join(candidate)
    }
}

pub fn read_report_at(dir: &Path, file: &str) -> Result<String, SyncError> {
    let path = resolve_report_path(dir, file);
    fs::read_to_string(&path).map_err(|e| io_err(&path, e))
}

fn operation_of(name: &str) -> String {
    name.strip_prefix("wip-")
        .and_then(|rest| rest.split('-').next())
        .filter(|op| !op.is_empty() && !op.ends_with(".md"))
        .unwrap_or("unknown")
        .to_string()
}

fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_from_file_name() {
        assert_eq!(operation_of("wip-push-20240101-120000.md"), "push");
        assert_eq!(operation_of("wip-checkpoint-20240101-120000-2.md"), "checkpoint");
        assert_eq!(operation_of("wip-.md"), "unknown");
        assert_eq!(operation_of("wip-x.md"), "unknown");
    }

    #[test]
    fn seconds_are_compacted() {
        assert_eq!(format_seconds(5), "5s");
        assert_eq!(format_seconds(125), "2m");
        assert_eq!(format_seconds(7200), "2h");
        assert_eq!(format_seconds(3 * 86400 + 10), "3d");
    }

    #[test]
    fn candidate_names_gain_numeric_suffixes() {
        let dir = Path::new("/r");
        let names: Vec<PathBuf> = candidates(dir, "wip-push-1.md").take(3).collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("/r/wip-push-1.md"),
                PathBuf::from("/r/wip-push-1-2.md"),
                PathBuf::from("/r/wip-push-1-3.md"),
            ]
        );
    }

    #[test]
    fn claim_never_replaces_an_existing_report() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let taken = dir.path().join("wip-push-1.md");
        fs::write(&taken, "first").expect("write");
        let tmp = dir.path().join(".pending.tmp");
        fs::write(&tmp, "second").expect("write");

        let path = claim(&tmp, dir.path(), "wip-push-1.md").expect("claim");
        assert_eq!(path, dir.path().join("wip-push-1-2.md"));
        assert_eq!(fs::read_to_string(&taken).expect("read"), "first");
        assert_eq!(fs::read_to_string(&path).expect("read"), "second");
    }

    #[test]
    fn show_argument_resolution() {
        let dir = Path::new("/ws/.wipctl");
        assert_eq!(
            resolve_report_path(dir, "wip-pull-1.md"),
            PathBuf::from("/ws/.wipctl/wip-pull-1.md")
        );
        assert_eq!(
            resolve_report_path(dir, "/tmp/elsewhere.md"),
            PathBuf::from("/tmp/elsewhere.md")
        );
    }
}
