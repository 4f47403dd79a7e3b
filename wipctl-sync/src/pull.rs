//! Pull: restore the newest WIP branch from `origin`.
//!
//! ```text
//! PreconditionCheck → Fetch → FindLatestRemoteWIP → Stash
//!   → SwitchOrCreateTracking → StashPop → ConflictCheck
//! ```
//!
//! Conflicts are reported, never resolved. A stash that could not be popped
//! cleanly stays in the stash list.

use wipctl_core::report::{EntryBuilder, Outcome, ReportEntry};
use wipctl_core::types::Repository;
use wipctl_git::{Effect, Git, OpContext};

use crate::coordinator::RepoHandler;
use crate::message;
use crate::steps::{fail, note, skip};

#[derive(Debug, Clone, Copy, Default)]
pub struct PullHandler;

impl PullHandler {
    fn drive(&self, git: &Git<'_>, repo: &Repository, entry: &mut EntryBuilder) -> Outcome {
        match git.preconditions() {
            Ok(pre) if pre.eligible => {}
            Ok(pre) => return skip(entry, pre.reason),
            Err(e) => return fail(entry, "precondition check failed", e),
        }

        let original = match git.current_branch() {
            Ok(branch) => branch,
            Err(e) => return fail(entry, "status check failed", e),
        };

        match git.fetch() {
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "fetch failed", e),
        }

        let wip = match git.latest_remote_wip() {
            Ok(Some(wip)) => wip,
            Ok(None) => {
                entry.push_warning("no WIP branches found on origin");
                return Outcome::NoWip;
            }
            Err(e) => return fail(entry, "WIP lookup failed", e),
        };
        entry.set_details(format!("{original} → {wip}"));

        let stashed = self.stash(git, repo, entry, &wip);

        let switched = match git.local_branch_exists(&wip) {
            Ok(true) => git.switch(&wip),
            Ok(false) => git.switch_create_tracking(&wip),
            Err(e) => Err(e),
        };
        match switched {
            Ok(effect) => note(entry, effect),
            Err(e) => return fail(entry, "switch to WIP branch failed", e),
        }

        if stashed {
            match git.stash_pop() {
                Ok(effect) => note(entry, effect),
                Err(e) => tracing::debug!(repo = %repo.name, error = %e, "stash pop failed"),
            }
        }

        match git.conflict_files() {
            Ok(files) if !files.is_empty() => {
                tracing::warn!(repo = %repo.name, files = ?files, "conflicts after pull");
                entry.push_warning(format!("conflicts in files: {}", files.join(", ")));
                if stashed {
                    entry.push_warning("auto-stash kept in the stash list");
                }
                return Outcome::Conflicts;
            }
            Ok(_) => {}
            Err(e) => entry.push_warning(format!("conflict detection failed: {e}")),
        }
        Outcome::Success
    }

    /// Best-effort stash. True only when this run created a stash entry, or
    /// under dry-run when `stash push -u` would have created one.
    fn stash(&self, git: &Git<'_>, repo: &Repository, entry: &mut EntryBuilder, wip: &str) -> bool {
        let before = git.stash_ref().ok().flatten();
        match git.stash(&message::stash_message(wip)) {
            Ok(effect @ Effect::Described(_)) => {
                note(entry, effect);
                return git.status_entries().is_ok_and(|changes| !changes.is_empty());
            }
            Ok(effect) => note(entry, effect),
            Err(e) => {
                tracing::debug!(repo = %repo.name, error = %e, "stash failed");
                return false;
            }
        }
        let after = git.stash_ref().ok().flatten();
        after.is_some() && after != before
    }
}

impl RepoHandler for PullHandler {
    fn process(&self, ctx: &OpContext, repo: &Repository) -> ReportEntry {
        let git = Git::new(ctx, &repo.path);
        let mut entry = ReportEntry::builder(repo.name.0.clone());
        let outcome = self.drive(&git, repo, &mut entry);
        tracing::info!(repo = %repo.name, %outcome, "pull finished");
        entry.finish(outcome)
    }
}
