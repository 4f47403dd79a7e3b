//! Subcommands and the plumbing they share.

pub mod checkpoint;
pub mod pull;
pub mod push;
pub mod report;
pub mod review;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use wipctl_ai::Generator;
use wipctl_core::config::WorkspaceConfig;
use wipctl_core::report::{Outcome, Report, ReportEntry};
use wipctl_git::OpContext;
use wipctl_renderer::{outcome_icon, ReportRenderer};
use wipctl_sync::{save_report_at, Observer};

/// Flags accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory searched for repositories.
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Describe mutating git commands instead of running them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Host segment of WIP branch names (defaults to the machine hostname).
    #[arg(long, global = true, env = "WIPCTL_HOST")]
    pub host: Option<String>,

    /// Where reports and config.yaml live (defaults to <workspace>/.wipctl).
    #[arg(long, global = true)]
    pub report_dir: Option<PathBuf>,

    /// Deadline for the whole operation, in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Generation provider: none or exec.
    #[arg(long, global = true, env = "WIPCTL_AI_PROVIDER")]
    pub ai_provider: Option<String>,

    /// Command line run by the exec provider.
    #[arg(long, global = true, env = "WIPCTL_AI_EXEC")]
    pub ai_exec: Option<String>,

    /// Bound on one generation call, in seconds.
    #[arg(long, global = true, env = "WIPCTL_AI_TIMEOUT", value_name = "SECS")]
    pub ai_timeout: Option<u64>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Resolve the workspace configuration for this invocation.
    pub fn config(&self) -> Result<WorkspaceConfig> {
        let root = self
            .workspace
            .canonicalize()
            .unwrap_or_else(|_| self.workspace.clone());
        WorkspaceConfig::resolve(root, self.host.clone(), self.dry_run, self.report_dir.clone())
            .with_context(|| format!("failed to load workspace '{}'", self.workspace.display()))
    }

    /// Operation context honouring `--dry-run` and `--timeout`, cancelled on Ctrl-C.
    pub fn context(&self, config: &WorkspaceConfig) -> OpContext {
        let mut ctx = OpContext::new(config.dry_run);
        if let Some(secs) = self.timeout {
            ctx = ctx.with_timeout(Duration::from_secs(secs));
        }
        cancel_on_interrupt(&ctx);
        ctx
    }

    /// The generation provider, chosen once: flags and environment first,
    /// then the settings file.
    pub fn generator(&self, config: &WorkspaceConfig) -> Arc<dyn Generator> {
        let settings = &config.settings.generator;
        let provider = self.ai_provider.as_deref().or(settings.provider.as_deref());
        let exec = self.ai_exec.as_deref().or(settings.exec.as_deref());
        let timeout = self
            .ai_timeout
            .or(settings.timeout_secs)
            .map(Duration::from_secs);
        let generator: Arc<dyn Generator> = Arc::from(wipctl_ai::from_settings(provider, exec, timeout));
        tracing::debug!(provider = generator.name(), "generator selected");
        generator
    }
}

// ---------------------------------------------------------------------------
// Logging and interruption
// ---------------------------------------------------------------------------

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Cancel `ctx` on the first Ctrl-C. Running git commands are killed and
/// their repositories left out of the report, as are units not yet started.
fn cancel_on_interrupt(ctx: &OpContext) {
    let ctx = ctx.clone();
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::debug!(error = %err, "interrupt handler unavailable");
                return;
            }
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted; stopping running repositories");
                ctx.cancel();
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Prints each entry as soon as its repository finishes.
pub fn progress_observer(dry_run: bool) -> Observer {
    Arc::new(move |entry: &ReportEntry| print_entry(entry, dry_run))
}

pub fn print_entry(entry: &ReportEntry, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let outcome = colored_outcome(entry.outcome);
    if entry.details.is_empty() {
        println!("{prefix}{} {}: {outcome}", outcome_icon(entry.outcome), entry.repo.bold());
    } else {
        println!(
            "{prefix}{} {}: {outcome} - {}",
            outcome_icon(entry.outcome),
            entry.repo.bold(),
            entry.details
        );
    }
    for warning in &entry.warnings {
        println!("    {} {warning}", "⚠".yellow());
    }
    for error in &entry.errors {
        println!("    {} {}", "✗".red(), error.red());
    }
}

fn colored_outcome(outcome: Outcome) -> colored::ColoredString {
    let label = outcome.as_str();
    match outcome {
        Outcome::Success => label.green(),
        Outcome::Skipped | Outcome::NoWip => label.yellow(),
        Outcome::Error | Outcome::Conflicts => label.red(),
    }
}

/// Print the tally, then store the report. A failed save is only a warning.
pub fn finish(config: &WorkspaceConfig, report: &Report) {
    let tally: Vec<String> = [
        Outcome::Success,
        Outcome::Skipped,
        Outcome::NoWip,
        Outcome::Conflicts,
        Outcome::Error,
    ]
    .into_iter()
    .map(|outcome| (outcome, report.count(outcome)))
    .filter(|(_, n)| *n > 0)
    .map(|(outcome, n)| format!("{n} {outcome}"))
    .collect();
    if tally.is_empty() {
        println!("No repositories processed.");
    } else {
        println!("{}", tally.join(", "));
    }

    let templates = config.report_dir.join("templates");
    let saved = ReportRenderer::with_overrides(Some(templates.as_path()))
        .map_err(anyhow::Error::from)
        .and_then(|renderer| {
            save_report_at(&config.report_dir, report, &renderer).map_err(anyhow::Error::from)
        });
    match saved {
        Ok(path) => println!("Report: {}", path.display()),
        Err(err) => {
            tracing::warn!(error = %err, "report not saved");
            eprintln!("{} report not saved: {err:#}", "warning:".yellow());
        }
    }
}
