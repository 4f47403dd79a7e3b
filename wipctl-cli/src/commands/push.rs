//! `wipctl push`: snapshot every repository onto a WIP branch on origin.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use wipctl_core::config::DEFAULT_SYNC_CONCURRENCY;
use wipctl_core::types::WipBranch;
use wipctl_sync::{pipeline, FixedAnswer, Prompter, PushHandler, PushOptions, StdinPrompter};

use super::{finish, progress_observer, GlobalArgs};

/// Arguments for `wipctl push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Repositories processed at once. Prompts are only shown when this is 1.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Stage all changes without asking.
    #[arg(long)]
    pub auto_add: bool,

    /// Use this WIP branch name instead of wip/<host>/<timestamp>.
    #[arg(long, value_name = "NAME")]
    pub prefix: Option<String>,

    /// Ask the generator for commit messages.
    #[arg(long)]
    pub ai_commit: bool,

    /// Show each generated message and ask before using it. Implies
    /// --ai-commit and a concurrency of 1.
    #[arg(long)]
    pub ai_review: bool,
}

impl PushArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.config()?;
        let ctx = global.context(&config);
        let concurrency = if self.ai_review {
            1
        } else {
            config.concurrency(self.concurrency, DEFAULT_SYNC_CONCURRENCY)
        };
        let interactive = concurrency == 1;

        let wip = match self.prefix {
            Some(name) if !name.trim().is_empty() => WipBranch::from(name.trim()),
            _ => WipBranch::generate(&config.host, None, &Local::now()),
        };
        let prefix = if config.dry_run { "[dry-run] " } else { "" };
        println!("{prefix}Pushing work in progress to {wip}");

        let options = PushOptions {
            host: config.host.clone(),
            wip,
            auto_add: self.auto_add,
            interactive,
            ai_commit: self.ai_commit || self.ai_review,
            ai_review: self.ai_review,
        };
        let prompter: Arc<dyn Prompter> = if interactive {
            Arc::new(StdinPrompter)
        } else {
            Arc::new(FixedAnswer(false))
        };
        let junk = pipeline::junk_guard(&config).context("invalid junk pattern")?;
        let handler = PushHandler::new(options, junk, global.generator(&config), prompter);

        let report = pipeline::push(
            &config,
            &ctx,
            concurrency,
            handler,
            Some(progress_observer(config.dry_run)),
        )
        .context("push failed")?;

        finish(&config, &report);
        Ok(())
    }
}
