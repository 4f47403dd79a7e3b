//! `wipctl review`: generated briefing for one repository or the whole workspace.
//!
//! Without a suggestion the collected context is printed as is.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use wipctl_ai::{suggest, GenerationInput, GenerationKind, RepoBriefingInput, WorkspaceContextInput};
use wipctl_core::config::DEFAULT_SCAN_CONCURRENCY;
use wipctl_core::types::Repository;
use wipctl_sync::{briefing, pipeline};

use super::GlobalArgs;

/// Arguments for `wipctl review`.
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Review a single repository instead of the workspace.
    pub repo_path: Option<PathBuf>,
}

impl ReviewArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.config()?;
        let ctx = global.context(&config);
        let generator = global.generator(&config);

        match self.repo_path {
            Some(path) => {
                let path = path.canonicalize().unwrap_or(path);
                let is_repo = wipctl_discover::is_working_copy(&path)
                    .with_context(|| format!("failed to inspect '{}'", path.display()))?;
                if !is_repo {
                    bail!("'{}' is not a git repository", path.display());
                }
                let repo = Repository::new(path);
                let input = briefing::repo_input(&ctx, &repo)
                    .with_context(|| format!("failed to read '{}'", repo.name))?;

                println!("{} {} ({})", "Review:".bold(), repo.name, input.branch);
                let request = GenerationInput::Repo(input.clone());
                match suggest(generator.as_ref(), GenerationKind::RepoReview, &request) {
                    Some(text) => println!("{text}"),
                    None => print_repo_fallback(&input),
                }
            }
            None => {
                let concurrency = config.concurrency(None, DEFAULT_SCAN_CONCURRENCY);
                let statuses = pipeline::status(&config, &ctx, concurrency).context("status failed")?;
                let input = briefing::workspace_input(&ctx, &statuses);

                println!("{} {}", "Workspace briefing:".bold(), config.root.display());
                let request = GenerationInput::Workspace(input.clone());
                match suggest(generator.as_ref(), GenerationKind::WorkspaceBriefing, &request) {
                    Some(text) => println!("{text}"),
                    None => print_workspace_fallback(&input),
                }
            }
        }
        Ok(())
    }
}

fn print_repo_fallback(input: &RepoBriefingInput) {
    println!("No briefing available; current state:");
    println!(
        "  {} files changed, +{}/-{}",
        input.files_count, input.lines_added, input.lines_removed
    );
    if !input.name_status.trim().is_empty() {
        println!("\n{}", "Changes".bold());
        for line in input.name_status.lines() {
            println!("  {line}");
        }
    }
    if !input.commit_messages.is_empty() {
        println!("\n{}", "Recent commits".bold());
        for subject in &input.commit_messages {
            println!("  - {subject}");
        }
    }
}

fn print_workspace_fallback(input: &WorkspaceContextInput) {
    println!("No briefing available; current state:");
    println!(
        "  {} repositories, {} active, {} dirty, {} files, {} lines, {} commits",
        input.repositories.len(),
        input.active_repos,
        input.dirty_repos,
        input.total_files,
        input.total_lines,
        input.total_commits
    );
    for repo in input.repositories.iter().filter(|r| r.files_changed > 0 || r.commits > 0) {
        println!("\n{} ({}, {})", repo.name.bold(), repo.branch, repo.status);
        println!(
            "  {} files, +{}/-{}, {} commits",
            repo.files_changed, repo.lines_added, repo.lines_removed, repo.commits
        );
        for subject in &repo.recent_work {
            println!("  - {subject}");
        }
    }
}
