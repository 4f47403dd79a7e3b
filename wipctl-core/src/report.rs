//! Per-repository outcomes and the run report.
//!
//! A [`ReportEntry`] is assembled with an [`EntryBuilder`] while a repository
//! is processed and frozen by [`EntryBuilder::finish`]. Entries are appended
//! to a [`Report`] and never modified afterwards; the report only hands out
//! shared references.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Outcome / Operation
// ---------------------------------------------------------------------------

/// Closed set of results for one repository in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Success,
    Error,
    Skipped,
    Conflicts,
    NoWip,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error => "error",
            Outcome::Skipped => "skipped",
            Outcome::Conflicts => "conflicts",
            Outcome::NoWip => "no-wip",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The workspace operation a report was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Push,
    Pull,
    Checkpoint,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Push => "push",
            Operation::Pull => "pull",
            Operation::Checkpoint => "checkpoint",
        }
    }

    /// Default report title.
    pub fn title(&self) -> &'static str {
        match self {
            Operation::Push => "WIP Push Report",
            Operation::Pull => "WIP Pull Report",
            Operation::Checkpoint => "Workspace Checkpoint",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Telemetry captured by a checkpoint before anything is staged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointTelemetry {
    /// Branch checked out when the checkpoint started.
    pub branch: String,
    pub files_modified: usize,
    pub files_added: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
    /// Short (8 char) hash of the checkpoint commit.
    pub commit_hash: String,
    pub wip_branch: String,
    pub recent_commits: Vec<String>,
    pub changed_files: Vec<String>,
    pub commit_message: String,
    pub feature: Option<String>,
    pub cross_repo_group: Option<String>,
}

impl CheckpointTelemetry {
    pub fn files_total(&self) -> usize {
        self.files_modified + self.files_added
    }

    pub fn lines_total(&self) -> usize {
        self.lines_added + self.lines_removed
    }
}

/// One repository's result for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub repo: String,
    pub outcome: Outcome,
    pub details: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<CheckpointTelemetry>,
}

impl ReportEntry {
    /// Start assembling the entry for `repo`.
    pub fn builder(repo: impl Into<String>) -> EntryBuilder {
        EntryBuilder {
            repo: repo.into(),
            details: String::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            checkpoint: None,
        }
    }

    /// Shorthand for an entry with a single error line.
    pub fn error(repo: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::builder(repo).details(message.clone()).error(message).finish(Outcome::Error)
    }
}

/// Accumulates details, warnings and errors until the outcome is known.
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    repo: String,
    details: String,
    warnings: Vec<String>,
    errors: Vec<String>,
    checkpoint: Option<CheckpointTelemetry>,
}

impl EntryBuilder {
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn set_details(&mut self, details: impl Into<String>) {
        self.details = details.into();
    }

    pub fn warn(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn telemetry(mut self, telemetry: CheckpointTelemetry) -> Self {
        self.checkpoint = Some(telemetry);
        self
    }

    pub fn set_telemetry(&mut self, telemetry: CheckpointTelemetry) {
        self.checkpoint = Some(telemetry);
    }

    pub fn telemetry_mut(&mut self) -> Option<&mut CheckpointTelemetry> {
        self.checkpoint.as_mut()
    }

    /// Freeze the entry with its single outcome.
    pub fn finish(self, outcome: Outcome) -> ReportEntry {
        ReportEntry {
            repo: self.repo,
            outcome,
            details: self.details,
            warnings: self.warnings,
            errors: self.errors,
            checkpoint: self.checkpoint,
        }
    }
}

// ---------------------------------------------------------------------------
// Workspace summary
// ---------------------------------------------------------------------------

/// Aggregate over all entries of a checkpoint run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub total_repos: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_files: usize,
    pub total_lines: usize,
    /// One-line description, e.g. `3 repos checkpointed, 12 files changed`.
    pub changes: String,
}

impl WorkspaceSummary {
    /// Compute the summary once every repository has finished.
    ///
    /// File and line totals only count successful entries.
    pub fn from_entries(total_repos: usize, entries: &[ReportEntry]) -> Self {
        let mut s = WorkspaceSummary {
            total_repos,
            processed: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match entry.outcome {
                Outcome::Success => {
                    s.successful += 1;
                    if let Some(t) = &entry.checkpoint {
                        s.total_files += t.files_total();
                        s.total_lines += t.lines_total();
                    }
                }
                Outcome::Error | Outcome::Conflicts => s.failed += 1,
                Outcome::Skipped | Outcome::NoWip => s.skipped += 1,
            }
        }

        let mut parts = Vec::new();
        if s.successful > 0 {
            parts.push(format!("{} repos checkpointed", s.successful));
        }
        if s.total_files > 0 {
            parts.push(format!("{} files changed", s.total_files));
        }
        if s.total_lines > 0 {
            parts.push(format!("{} lines modified", s.total_lines));
        }
        if s.failed > 0 {
            parts.push(format!("{} failures", s.failed));
        }
        s.changes = parts.join(", ");
        s
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Results of one workspace operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub operation: Operation,
    pub workspace: PathBuf,
    pub timestamp: DateTime<Local>,
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default)]
    pub cross_repo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<WorkspaceSummary>,
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new(operation: Operation, workspace: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            title: operation.title().to_string(),
            operation,
            workspace: workspace.into(),
            timestamp: Local::now(),
            dry_run,
            feature: None,
            cross_repo: false,
            summary: None,
            entries: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: Option<String>, cross_repo: bool) -> Self {
        self.feature = feature;
        self.cross_repo = cross_repo;
        self
    }

    /// Append a finished entry. Entries are never modified after this call.
    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Sort entries by repository name for stable rendering.
    pub fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| a.repo.cmp(&b.repo));
    }

    /// Compute and attach the workspace summary.
    pub fn summarize(&mut self, total_repos: usize) {
        self.summary = Some(WorkspaceSummary::from_entries(total_repos, &self.entries));
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    /// `wip-<operation>-<YYYYMMDD-HHMMSS>.md`
    pub fn file_name(&self) -> String {
        format!(
            "wip-{}-{}.md",
            self.operation,
            self.timestamp.format("%Y%m%d-%H%M%S")
        )
    }
}
