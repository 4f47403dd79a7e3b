//! Push: snapshot each repository onto a fresh WIP branch on `origin`.
//!
//! ```text
//! PreconditionCheck → Fetch → StageDecision → MessageGeneration
//!   → BranchCreate → Commit → PushWIP → SwitchBackAndPushOriginal
//! ```
//!
//! The entry is `success` only once the WIP branch is on `origin`.

use std::sync::Arc;

use chrono::Local;

use wipctl_ai::{suggest, CommitMsgInput, GenerationInput, GenerationKind, Generator};
use wipctl_core::report::{EntryBuilder, Outcome, ReportEntry};
use wipctl_core::types::{Repository, WipBranch};
use wipctl_git::{Git, JunkGuard, OpContext};

use crate::coordinator::RepoHandler;
use crate::message;
use crate::prompt::Prompter;
use crate::steps::{fail, free_wip_name, note, restore_original, skip};

/// Run-wide push settings.
#[derive(Debug, Clone)]
pub struct PushOptions {
    /// Host segment shown in fallback messages.
    pub host: String,
    /// WIP name shared by every repository of the run.
    pub wip: WipBranch,
    /// Stage changes without asking.
    pub auto_add: bool,
    /// Prompts are allowed (serial runs only).
    pub interactive: bool,
    /// Ask the generator for commit messages.
    pub ai_commit: bool,
    /// Show generated messages and require acceptance.
    pub ai_review: bool,
}

pub struct PushHandler {
    options: PushOptions,
    junk: JunkGuard,
    generator: Arc<dyn Generator>,
    prompter: Arc<dyn Prompter>,
}

impl PushHandler {
    pub fn new(
        options: PushOptions,
        junk: JunkGuard,
        generator: Arc<dyn Generator>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            options,
            junk,
            generator,
            prompter,
        }
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

        let branch = match git.current_branch() {
            Ok(branch) => branch,
            Err(e) => return fail(entry, "status check failed", e),
        };
        let (dirty, untracked) = match (git.dirty_count(), git.untracked_files()) {
            (Ok(dirty), Ok(untracked)) => (dirty, untracked),
            (Err(e), _) | (_, Err(e)) => return fail(entry, "status check failed", e),
        };

        let wip = match free_wip_name(git, &self.options.wip) {
            Ok(wip) => wip,
            Err(e) => return fail(entry, "WIP name check failed", e),
        };
        entry.set_details(format!("{branch} (wip={wip})"));

        let changes = dirty + untracked.len();
        if changes > 0 {
            if let Some(stop) = self.stage(git, repo, entry, &untracked) {
                return stop;
            }
        }

        let message = self.commit_message(git, repo, &branch, changes);

        match git.switch_create(wip.as_str()) {
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "create WIP branch failed", e),
        }
        match git.commit_allow_empty(&message) {
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "commit failed", e),
        }
        match git.push_with_upstream(wip.as_str()) {
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "push WIP branch failed", e),
        }

        restore_original(git, entry, &branch, false);
        Outcome::Success
    }

    /// `Some(outcome)` stops the machine.
    fn stage(
        &self,
        git: &Git<'_>,
        repo: &Repository,
        entry: &mut EntryBuilder,
        untracked: &[String],
    ) -> Option<Outcome> {
        let junk = self.junk.find(untracked);
        if !junk.is_empty() {
            tracing::warn!(repo = %repo.name, files = ?junk, "junk files present; fix .gitignore");
            entry.set_details("untracked junk files present");
            entry.push_warning(format!("untracked junk files found: {}", junk.join(", ")));
            return Some(Outcome::Skipped);
        }

        if !self.options.auto_add {
            if !self.options.interactive {
                return Some(skip(entry, "changes present but auto-add not enabled"));
            }
            let question = format!("{}: add all changes and continue?", repo.name);
            if !self.prompter.confirm(&question) {
                return Some(skip(entry, "user declined to add changes"));
            }
        }

        match git.add_all() {
            Ok(effect) => {
                note(entry, effect);
                None
            }
            Err(e) => Some(fail(entry, "add all failed", e)),
        }
    }

    fn commit_message(&self, git: &Git<'_>, repo: &Repository, branch: &str, files: usize) -> String {
        let fallback = message::push_fallback(&self.options.host, branch, files, &Local::now());
        if !self.options.ai_commit {
            return fallback;
        }

        let input = GenerationInput::Commit(CommitMsgInput {
            repo: repo.name.0.clone(),
            branch: branch.to_string(),
            host: self.options.host.clone(),
            name_status: git.staged_name_status().unwrap_or_default(),
            diff_stat: git.staged_diff_stat().unwrap_or_default(),
            untracked: git.untracked_files().unwrap_or_default(),
            prior_subjects: git.recent_subjects(5),
        });
        let Some(generated) = suggest(self.generator.as_ref(), GenerationKind::CommitMessage, &input)
        else {
            return fallback;
        };

        if self.options.ai_review {
            self.prompter.show(&generated);
            if !self.prompter.confirm(&format!("{}: accept this message?", repo.name)) {
                return fallback;
            }
        }
        generated
    }
}

impl RepoHandler for PushHandler {
    fn process(&self, ctx: &OpContext, repo: &Repository) -> ReportEntry {
        let git = Git::new(ctx, &repo.path);
        let mut entry = ReportEntry::builder(repo.name.0.clone());
        let outcome = self.drive(&git, repo, &mut entry);
        tracing::info!(repo = %repo.name, %outcome, "push finished");
        entry.finish(outcome)
    }
}
