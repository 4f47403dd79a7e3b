//! Checkpoint: push semantics with mandatory staging and telemetry.
//!
//! Telemetry (changed paths, recent subjects, counts, line deltas) is taken
//! before anything is staged. The optional feature tag only annotates the
//! entry and adds a segment to the WIP name.

use std::sync::Arc;

use chrono::{DateTime, Local};

use wipctl_ai::{suggest, CommitMsgInput, GenerationInput, GenerationKind, Generator};
use wipctl_core::report::{CheckpointTelemetry, EntryBuilder, Outcome, ReportEntry};
use wipctl_core::types::{Repository, WipBranch};
use wipctl_git::{Effect, Git, JunkGuard, OpContext};

use crate::coordinator::RepoHandler;
use crate::message;
use crate::steps::{fail, free_wip_name, note, restore_original, skip};

const SHORT_HASH: usize = 8;

#[derive(Debug, Clone)]
pub struct CheckpointOptions {
    pub host: String,
    pub feature: Option<String>,
    /// Group the run under `feature` across repositories.
    pub cross_repo: bool,
    /// `--message` prefix, rendered as `[<prefix>] `.
    pub message_prefix: Option<String>,
    /// Instant used for every WIP name of the run.
    pub at: DateTime<Local>,
}

pub struct CheckpointHandler {
    options: CheckpointOptions,
    junk: JunkGuard,
    generator: Arc<dyn Generator>,
}

impl CheckpointHandler {
    pub fn new(options: CheckpointOptions, junk: JunkGuard, generator: Arc<dyn Generator>) -> Self {
        Self {
            options,
            junk,
            generator,
        }
    }

    pub fn options(&self) -> &CheckpointOptions {
        &self.options
    }

    fn drive(&self, git: &Git<'_>, repo: &Repository, entry: &mut EntryBuilder) -> Outcome {
        match git.preconditions() {
            Ok(pre) if pre.eligible => {}
            Ok(pre) => return skip(entry, pre.reason),
            Err(e) => return fail(entry, "precondition check failed", e),
        }

        match git.fetch() {
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "fetch failed", e),
        }

        let (telemetry, untracked) = match self.telemetry(git) {
            Ok(captured) => captured,
            Err(e) => return fail(entry, "status check failed", e),
        };
        let branch = telemetry.branch.clone();
        let (modified, added) = (telemetry.files_modified, telemetry.files_added);
        entry.set_telemetry(telemetry);

        let junk = self.junk.find(&untracked);
        if !junk.is_empty() {
            tracing::warn!(repo = %repo.name, files = ?junk, "junk files present; fix .gitignore");
            entry.set_details("untracked junk files present");
            entry.push_warning(format!("untracked junk files found: {}", junk.join(", ")));
            return Outcome::Skipped;
        }

        if modified + added > 0 {
            match git.add_all() {
                Ok(effect) => note(entry, effect),
                Err(e) => return fail(entry, "failed to stage changes", e),
            }
        }

        let commit_message = self.commit_message(git, repo, &branch, modified, added);
        let base = WipBranch::generate(
            &self.options.host,
            self.options.feature.as_deref(),
            &self.options.at,
        );
        let wip = match free_wip_name(git, &base) {
            Ok(wip) => wip,
            Err(e) => return fail(entry, "WIP name check failed", e),
        };
        if let Some(t) = entry.telemetry_mut() {
            t.commit_message = commit_message.clone();
            t.wip_branch = wip.0.clone();
        }

        match git.switch_create(wip.as_str()) {
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "failed to create WIP branch", e),
        }
        match git.commit_allow_empty(&commit_message) {
            Ok(Effect::Applied) => {
                let hash = git.head_hash().unwrap_or_default();
                if let Some(t) = entry.telemetry_mut() {
                    t.commit_hash = hash.chars().take(SHORT_HASH).collect();
                }
            }
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "failed to create commit", e),
        }
        match git.push_with_upstream(wip.as_str()) {
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "failed to push WIP branch", e),
        }

        restore_original(git, entry, &branch, true);
        entry.set_details(format!("checkpointed to {wip}"));
        Outcome::Success
    }

    /// Telemetry plus the untracked list, read before staging.
    fn telemetry(
        &self,
        git: &Git<'_>,
    ) -> Result<(CheckpointTelemetry, Vec<String>), wipctl_git::GitError> {
        let branch = git.current_branch()?;
        let entries = git.status_entries()?;
        let untracked = git.untracked_files()?;
        let lines = git.line_stats();
        let feature = self.options.feature.clone();

        let telemetry = CheckpointTelemetry {
            branch,
            files_modified: entries.iter().filter(|e| !e.is_untracked()).count(),
            files_added: untracked.len(),
            lines_added: lines.added,
            lines_removed: lines.removed,
            recent_commits: git.recent_subjects(3),
            changed_files: entries.into_iter().map(|e| e.path).collect(),
            cross_repo_group: feature.clone().filter(|_| self.options.cross_repo),
            feature,
            ..CheckpointTelemetry::default()
        };
        Ok((telemetry, untracked))
    }

    fn commit_message(
        &self,
        git: &Git<'_>,
        repo: &Repository,
        branch: &str,
        modified: usize,
        added: usize,
    ) -> String {
        let prefix = self.options.message_prefix.as_deref();
        let input = GenerationInput::Commit(CommitMsgInput {
            repo: repo.name.0.clone(),
            branch: branch.to_string(),
            host: self.options.host.clone(),
            name_status: git.staged_name_status().unwrap_or_default(),
            diff_stat: git.staged_diff_stat().unwrap_or_default(),
            untracked: Vec::new(),
            prior_subjects: git.recent_subjects(5),
        });
        match suggest(self.generator.as_ref(), GenerationKind::CommitMessage, &input) {
            Some(generated) => {
                message::decorate_checkpoint(&generated, self.options.feature.as_deref(), prefix)
            }
            None => message::checkpoint_fallback(prefix, modified, added, &Local::now()),
        }
    }
}

impl RepoHandler for CheckpointHandler {
    fn process(&self, ctx: &OpContext, repo: &Repository) -> ReportEntry {
        let git = Git::new(ctx, &repo.path);
        let mut entry = ReportEntry::builder(repo.name.0.clone());
        let outcome = self.drive(&git, repo, &mut entry);
        tracing::info!(repo = %repo.name, %outcome, "checkpoint finished");
        entry.finish(outcome)
    }
}
