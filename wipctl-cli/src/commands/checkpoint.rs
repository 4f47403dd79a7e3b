//! `wipctl checkpoint`: push every repository with local work, with telemetry.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use wipctl_core::config::DEFAULT_SCAN_CONCURRENCY;
use wipctl_sync::{pipeline, CheckpointHandler, CheckpointOptions};

use super::{finish, progress_observer, GlobalArgs};

/// Arguments for `wipctl checkpoint`.
#[derive(Args, Debug)]
pub struct CheckpointArgs {
    /// Repositories processed at once.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Prefix for commit messages, written as `[PREFIX] `.
    #[arg(long, value_name = "PREFIX")]
    pub message: Option<String>,

    /// Feature the work belongs to; becomes part of the WIP branch name.
    #[arg(long, value_name = "NAME")]
    pub feature: Option<String>,

    /// Group the checkpoint under the feature across repositories.
    #[arg(long, requires = "feature")]
    pub cross_repo: bool,
}

impl CheckpointArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.config()?;
        let ctx = global.context(&config);
        let concurrency = config.concurrency(self.concurrency, DEFAULT_SCAN_CONCURRENCY);

        let feature = self.feature.filter(|f| !f.trim().is_empty());
        let prefix = if config.dry_run { "[dry-run] " } else { "" };
        match feature.as_deref() {
            Some(name) => println!("{prefix}Checkpointing feature {}", name.bold()),
            None => println!("{prefix}Checkpointing workspace"),
        }

        let options = CheckpointOptions {
            host: config.host.clone(),
            feature,
            cross_repo: self.cross_repo,
            message_prefix: self.message.filter(|m| !m.trim().is_empty()),
            at: Local::now(),
        };
        let junk = pipeline::junk_guard(&config).context("invalid junk pattern")?;
        let handler = CheckpointHandler::new(options, junk, global.generator(&config));

        let report = pipeline::checkpoint(
            &config,
            &ctx,
            concurrency,
            handler,
            Some(progress_observer(config.dry_run)),
        )
        .context("checkpoint failed")?;

        if report.entries().is_empty() {
            println!("No checkpoint needed: every repository is clean.");
            return Ok(());
        }
        if let Some(summary) = report.summary.as_ref() {
            println!(
                "{} of {} repositories checkpointed, {} files, {} lines",
                summary.successful, summary.total_repos, summary.total_files, summary.total_lines
            );
        }
        finish(&config, &report);
        Ok(())
    }
}
