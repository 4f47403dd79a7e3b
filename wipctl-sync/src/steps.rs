//! Steps shared by the push and checkpoint machines.

use wipctl_core::report::{EntryBuilder, Outcome};
use wipctl_core::types::WipBranch;
use wipctl_git::{Effect, Git, GitError};

/// First free name among `base`, `base-2`, `base-3`, …
///
/// A name is taken when it exists as a local branch or as an `origin`
/// tracking ref.
pub(crate) fn free_wip_name(git: &Git<'_>, base: &WipBranch) -> Result<WipBranch, GitError> {
    let mut candidate = base.clone();
    let mut n = 2;
    while git.local_branch_exists(candidate.as_str())?
        || git.remote_tracking_exists(candidate.as_str())?
    {
        tracing::debug!(repo = %git.repo().display(), taken = %candidate, "WIP name in use");
        candidate = base.with_suffix(n);
        n += 1;
    }
    Ok(candidate)
}

/// Record what a dry-run would have done.
pub(crate) fn note(entry: &mut EntryBuilder, effect: Effect) {
    if let Effect::Described(description) = effect {
        entry.push_warning(format!("[dry-run] {description}"));
    }
}

/// Return to `branch` and push it when `origin` has it. Without an `origin`
/// copy the switch only happens when `always_switch` is set. Failures are
/// warnings.
pub(crate) fn restore_original(
    git: &Git<'_>,
    entry: &mut EntryBuilder,
    branch: &str,
    always_switch: bool,
) {
    let on_origin = match git.remote_has_branch(branch) {
        Ok(found) => found,
        Err(e) => {
            entry.push_warning(format!("could not query origin for {branch}: {e}"));
            false
        }
    };
    if !on_origin && !always_switch {
        return;
    }

    match git.switch(branch) {
        Ok(effect) => note(entry, effect),
        Err(e) => {
            entry.push_warning(format!("failed to switch back to {branch}: {e}"));
            return;
        }
    }
    if on_origin {
        match git.push(branch) {
            Ok(effect) => note(entry, effect),
            Err(e) => entry.push_warning(format!("failed to push original branch {branch}: {e}")),
        }
    }
}

/// Record `error` under `step` and classify the entry as failed.
pub(crate) fn fail(entry: &mut EntryBuilder, step: &str, error: GitError) -> Outcome {
    entry.push_error(format!("{step}: {error}"));
    Outcome::Error
}

/// Skip with `reason` as both details and warning.
pub(crate) fn skip(entry: &mut EntryBuilder, reason: impl Into<String>) -> Outcome {
    let reason = reason.into();
    entry.set_details(reason.clone());
    entry.push_warning(reason);
    Outcome::Skipped
}
