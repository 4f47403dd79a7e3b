//! `wipctl status`: one row per repository, optionally with a generated synopsis.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use wipctl_ai::{suggest, GenerationInput, GenerationKind};
use wipctl_core::config::DEFAULT_SCAN_CONCURRENCY;
use wipctl_core::types::{RepoState, RepositoryStatus};
use wipctl_sync::{briefing, pipeline};

use super::GlobalArgs;

/// Arguments for `wipctl status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Repositories inspected at once.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Append a generated synopsis of the workspace.
    #[arg(long)]
    pub ai: bool,

    /// Emit machine-readable JSON.
    #[arg(long, conflicts_with = "ai")]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.config()?;
        let ctx = global.context(&config);
        let concurrency = config.concurrency(self.concurrency, DEFAULT_SCAN_CONCURRENCY);

        let statuses = pipeline::status(&config, &ctx, concurrency).context("status failed")?;

        if self.json {
            print_json(&statuses)?;
            return Ok(());
        }

        print_table(&statuses);
        if self.ai {
            let generator = global.generator(&config);
            let input = GenerationInput::Workspace(briefing::synopsis_input(&statuses));
            println!();
            match suggest(generator.as_ref(), GenerationKind::Synopsis, &input) {
                Some(text) => {
                    println!("{}", "Synopsis".bold());
                    println!("{text}");
                }
                None => println!("No synopsis available."),
            }
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "repository")]
    repo: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "files")]
    files: String,
    #[tabled(rename = "lines")]
    lines: String,
    #[tabled(rename = "commits")]
    commits: String,
    #[tabled(rename = "ahead")]
    ahead: String,
    #[tabled(rename = "behind")]
    behind: String,
    #[tabled(rename = "size")]
    size: String,
}

impl From<&RepositoryStatus> for StatusTableRow {
    fn from(status: &RepositoryStatus) -> Self {
        let state = status.state();
        if state == RepoState::Error {
            let dash = || "-".to_string();
            return Self {
                repo: status.name.clone(),
                branch: dash(),
                state: state.to_string(),
                files: dash(),
                lines: dash(),
                commits: dash(),
                ahead: dash(),
                behind: dash(),
                size: dash(),
            };
        }
        Self {
            repo: status.name.clone(),
            branch: status.branch.clone(),
            state: state.to_string(),
            files: status.files_changed.to_string(),
            lines: format!("+{}/-{}", status.lines_added, status.lines_removed),
            commits: status.commit_count.to_string(),
            ahead: status.ahead.to_string(),
            behind: status.behind.to_string(),
            size: status.size.clone(),
        }
    }
}

fn print_table(statuses: &[RepositoryStatus]) {
    let dirty = statuses
        .iter()
        .filter(|s| s.state() == RepoState::Dirty)
        .count();
    println!(
        "wipctl v{} | {} repositories | {} dirty",
        env!("CARGO_PKG_VERSION"),
        statuses.len(),
        dirty,
    );

    if statuses.is_empty() {
        println!("No repositories found.");
        return;
    }

    let rows: Vec<StatusTableRow> = statuses.iter().map(StatusTableRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for status in statuses {
        if let Some(err) = status.error.as_deref() {
            println!("{} {}: {}", "✗".red(), status.name.bold(), err);
        }
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    repositories: usize,
    dirty: usize,
    statuses: Vec<StatusRowJson<'a>>,
}

#[derive(Serialize)]
struct StatusRowJson<'a> {
    state: RepoState,
    #[serde(flatten)]
    status: &'a RepositoryStatus,
}

fn print_json(statuses: &[RepositoryStatus]) -> Result<()> {
    let payload = StatusJson {
        repositories: statuses.len(),
        dirty: statuses
            .iter()
            .filter(|s| s.state() == RepoState::Dirty)
            .count(),
        statuses: statuses
            .iter()
            .map(|status| StatusRowJson {
                state: status.state(),
                status,
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}
