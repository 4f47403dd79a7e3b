//! Template context: serializable rendering payload built from a [`Report`].

use serde::{Deserialize, Serialize};

use wipctl_core::report::{CheckpointTelemetry, Outcome, Report, ReportEntry, WorkspaceSummary};

use crate::error::RenderError;

/// Flat rendering payload for report templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContext {
    pub title: String,
    pub operation: String,
    pub workspace: String,
    /// RFC 3339.
    pub timestamp: String,
    pub dry_run: bool,
    pub feature: Option<String>,
    pub cross_repo: bool,
    pub summary: Option<WorkspaceSummary>,
    pub entries: Vec<EntryContext>,
    /// Successful repositories tagged with the run's feature.
    pub feature_repos: Vec<String>,
}

/// One repository line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryContext {
    pub repo: String,
    pub outcome: String,
    pub icon: String,
    pub details: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub checkpoint: Option<CheckpointTelemetry>,
}

impl ReportContext {
    pub fn from_report(report: &Report) -> Self {
        let feature_repos = match &report.feature {
            Some(feature) => report
                .entries()
                .iter()
                .filter(|e| e.outcome == Outcome::Success)
                .filter(|e| {
                    e.checkpoint
                        .as_ref()
                        .and_then(|c| c.feature.as_deref())
                        == Some(feature.as_str())
                })
                .map(|e| e.repo.clone())
                .collect(),
            None => Vec::new(),
        };

        Self {
            title: report.title.clone(),
            operation: report.operation.to_string(),
            workspace: report.workspace.display().to_string(),
            timestamp: report.timestamp.to_rfc3339(),
            dry_run: report.dry_run,
            feature: report.feature.clone(),
            cross_repo: report.cross_repo,
            summary: report.summary.clone(),
            entries: report.entries().iter().map(EntryContext::from_entry).collect(),
            feature_repos,
        }
    }

    /// Convert to a [`tera::Context`].
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

impl EntryContext {
    fn from_entry(entry: &ReportEntry) -> Self {
        Self {
            repo: entry.repo.clone(),
            outcome: entry.outcome.to_string(),
            icon: outcome_icon(entry.outcome).to_string(),
            details: entry.details.clone(),
            warnings: entry.warnings.clone(),
            errors: entry.errors.clone(),
            checkpoint: entry.checkpoint.clone(),
        }
    }
}

pub fn outcome_icon(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Success => "✅",
        Outcome::Error => "❌",
        Outcome::Skipped => "⏭",
        Outcome::Conflicts => "⚔",
        Outcome::NoWip => "∅",
    }
}
