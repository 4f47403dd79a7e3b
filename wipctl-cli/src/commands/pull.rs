//! `wipctl pull`: switch every repository to its newest WIP branch on origin.

use anyhow::{Context, Result};
use clap::Args;

use wipctl_core::config::DEFAULT_SYNC_CONCURRENCY;
use wipctl_sync::pipeline;

use super::{finish, progress_observer, GlobalArgs};

/// Arguments for `wipctl pull`.
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Repositories processed at once.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl PullArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.config()?;
        let ctx = global.context(&config);
        let concurrency = config.concurrency(self.concurrency, DEFAULT_SYNC_CONCURRENCY);

        let report = pipeline::pull(
            &config,
            &ctx,
            concurrency,
            Some(progress_observer(config.dry_run)),
        )
        .context("pull failed")?;

        finish(&config, &report);
        Ok(())
    }
}
