//! wipctl: keep work-in-progress in sync across every repository of a workspace.
//!
//! # Usage
//!
//! ```text
//! wipctl [--workspace <path>] [--dry-run] status [--ai] [--json]
//! wipctl push [--auto-add] [--prefix <name>] [--ai-commit] [--ai-review]
//! wipctl pull
//! wipctl checkpoint [--message <prefix>] [--feature <name> [--cross-repo]]
//! wipctl review [<repo-path>]
//! wipctl report [--show <file>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    checkpoint::CheckpointArgs, pull::PullArgs, push::PushArgs, report::ReportArgs,
    review::ReviewArgs, status::StatusArgs, GlobalArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "wipctl",
    version,
    about = "Synchronize work-in-progress across the git repositories of a workspace",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show branch, changes and sync state of every repository.
    Status(StatusArgs),

    /// Commit local work onto a fresh WIP branch and push it to origin.
    Push(PushArgs),

    /// Switch every repository to its most recent WIP branch from origin.
    Pull(PullArgs),

    /// Push a feature-tagged snapshot of every repository with local work.
    Checkpoint(CheckpointArgs),

    /// Ask the generator for a briefing on one repository or the workspace.
    Review(ReviewArgs),

    /// List stored reports or print one.
    Report(ReportArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::init_tracing(cli.global.verbose);

    let global = cli.global;
    match cli.command {
        Commands::Status(args) => args.run(&global),
        Commands::Push(args) => args.run(&global),
        Commands::Pull(args) => args.run(&global),
        Commands::Checkpoint(args) => args.run(&global),
        Commands::Review(args) => args.run(&global),
        Commands::Report(args) => args.run(&global),
    }
}
