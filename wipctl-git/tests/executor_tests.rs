//! Executor tests against real repositories.
//!
//! Every test builds a working copy with a bare `origin` inside its own
//! `TempDir`. Identity and signing are configured per repository so the
//! host's git configuration does not leak in.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use rstest::rstest;
use tempfile::TempDir;
use wipctl_git::{Effect, Git, GitError, Mutation, OpContext};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn git_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .envs(env.iter().copied())
        .output()
        .expect("spawn git");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn git(dir: &Path, args: &[&str]) -> String {
    git_env(dir, args, &[])
}

fn configure(dir: &Path) {
    git(dir, &["config", "user.name", "wipctl test"]);
    git(dir, &["config", "user.email", "test@wipctl.invalid"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

struct Fixture {
    _tmp: TempDir,
    work: PathBuf,
}

/// Working copy on `main` with one commit pushed to a bare `origin`.
fn fixture() -> Fixture {
    let tmp = TempDir::new().expect("tempdir");
    let origin = tmp.path().join("origin.git");
    let work = tmp.path().join("work");
    fs::create_dir_all(&origin).expect("mkdir origin");
    fs::create_dir_all(&work).expect("mkdir work");

    git(&origin, &["init", "--bare", "-q"]);
    git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&work, &["init", "-q"]);
    git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure(&work);
    git(&work, &["remote", "add", "origin", origin.to_str().expect("utf8 path")]);

    fs::write(work.join("README.md"), "hello\n").expect("write");
    git(&work, &["add", "-A"]);
    git(&work, &["commit", "-q", "-m", "initial"]);
    git(&work, &["push", "-q", "-u", "origin", "main"]);

    Fixture { _tmp: tmp, work }
}

fn make_dirty(work: &Path) {
    fs::write(work.join("README.md"), "hello\nchanged\n").expect("modify");
    fs::write(work.join("notes.txt"), "untracked\n").expect("untracked");
}

// ---------------------------------------------------------------------------
// Dry-run
// ---------------------------------------------------------------------------

#[rstest]
#[case(Mutation::Fetch)]
#[case(Mutation::AddAll)]
#[case(Mutation::CommitAllowEmpty { message: "wip".into() })]
#[case(Mutation::Switch { branch: "main".into() })]
#[case(Mutation::SwitchCreate { branch: "wip/h/20240101-000000".into() })]
#[case(Mutation::SwitchCreateTracking { branch: "wip/h/20240101-000000".into() })]
#[case(Mutation::Push { branch: "main".into() })]
#[case(Mutation::PushUpstream { branch: "wip/h/20240101-000000".into() })]
#[case(Mutation::Stash { message: "auto".into() })]
#[case(Mutation::StashPop)]
fn dry_run_leaves_porcelain_identical(#[case] mutation: Mutation) {
    let fx = fixture();
    make_dirty(&fx.work);
    let before = git(&fx.work, &["status", "--porcelain"]);
    let head_before = git(&fx.work, &["rev-parse", "HEAD"]);

    let ctx = OpContext::new(true);
    let effect = Git::new(&ctx, &fx.work).apply(&mutation).expect("dry-run apply");

    assert_eq!(effect, Effect::Described(format!("would run: {mutation}")));
    assert_eq!(git(&fx.work, &["status", "--porcelain"]), before);
    assert_eq!(git(&fx.work, &["rev-parse", "HEAD"]), head_before);
    assert!(git(&fx.work, &["stash", "list"]).is_empty());
}

#[test]
fn read_only_verbs_run_under_dry_run() {
    let fx = fixture();
    make_dirty(&fx.work);
    let ctx = OpContext::new(true);
    let g = Git::new(&ctx, &fx.work);
    assert_eq!(g.current_branch().expect("branch"), "main");
    assert_eq!(g.dirty_count().expect("dirty"), 1);
    assert_eq!(g.untracked_files().expect("untracked"), vec!["notes.txt"]);
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[test]
fn status_queries_on_a_fresh_clone() {
    let fx = fixture();
    let ctx = OpContext::new(false);
    let g = Git::new(&ctx, &fx.work);

    assert!(g.has_origin().expect("origin"));
    assert!(!g.in_progress().expect("in progress"));
    assert_eq!(g.ahead_behind(), (0, 0));
    assert_eq!(g.commit_count(), 1);
    assert_eq!(g.last_subject(), "initial");
    assert!(g.remote_has_branch("main").expect("ls-remote"));
    assert!(!g.remote_has_branch("nope").expect("ls-remote"));
    assert!(g.local_branch_exists("main").expect("local"));
    assert!(g.remote_tracking_exists("main").expect("tracking"));
    assert_eq!(g.stash_ref().expect("stash ref"), None);
    assert_eq!(g.head_hash().expect("head").len(), 40);
}

#[test]
fn ahead_and_line_stats_after_local_work() {
    let fx = fixture();
    fs::write(fx.work.join("a.txt"), "1\n").expect("write");
    git(&fx.work, &["add", "a.txt"]);
    git(&fx.work, &["commit", "-q", "-m", "add a"]);
    fs::write(fx.work.join("README.md"), "hello\nmore\nlines\n").expect("modify");

    let ctx = OpContext::new(false);
    let g = Git::new(&ctx, &fx.work);
    assert_eq!(g.ahead_behind(), (1, 0));
    let stats = g.line_stats();
    assert_eq!(stats.added, 2);
    assert_eq!(stats.files, 1);
    assert_eq!(g.recent_subjects(5), vec!["add a", "initial"]);
}

#[test]
fn preconditions_reject_missing_origin() {
    let tmp = TempDir::new().expect("tempdir");
    git(tmp.path(), &["init", "-q"]);
    let ctx = OpContext::new(false);
    let pre = Git::new(&ctx, tmp.path()).preconditions().expect("preconditions");
    assert!(!pre.eligible);
    assert_eq!(pre.reason, "no origin remote");
}

#[test]
fn merge_conflict_is_in_progress_and_listed() {
    let fx = fixture();
    let w = &fx.work;
    git(w, &["switch", "-q", "-c", "other"]);
    fs::write(w.join("README.md"), "theirs\n").expect("write");
    git(w, &["commit", "-q", "-am", "theirs"]);
    git(w, &["switch", "-q", "main"]);
    fs::write(w.join("README.md"), "ours\n").expect("write");
    git(w, &["commit", "-q", "-am", "ours"]);
    let merge = Command::new("git")
        .args(["merge", "other"])
        .current_dir(w)
        .output()
        .expect("spawn merge");
    assert!(!merge.status.success(), "merge should conflict");

    let ctx = OpContext::new(false);
    let g = Git::new(&ctx, w);
    assert_eq!(g.conflict_files().expect("conflicts"), vec!["README.md"]);
    let pre = g.preconditions().expect("preconditions");
    assert!(!pre.eligible);
    assert_eq!(pre.reason, "rebase/merge in progress");
}

#[test]
fn latest_remote_wip_uses_committer_time() {
    let fx = fixture();
    let w = &fx.work;
    // Lexically later name, earlier commit.
    git(w, &["switch", "-q", "-c", "wip/h/20991231-235959"]);
    git_env(
        w,
        &["commit", "-q", "--allow-empty", "-m", "older"],
        &[("GIT_COMMITTER_DATE", "2024-01-01T10:00:00+00:00")],
    );
    git(w, &["push", "-q", "origin", "wip/h/20991231-235959"]);
    git(w, &["switch", "-q", "main"]);
    git(w, &["switch", "-q", "-c", "wip/h/20000101-000000"]);
    git_env(
        w,
        &["commit", "-q", "--allow-empty", "-m", "newer"],
        &[("GIT_COMMITTER_DATE", "2024-06-01T10:00:00+00:00")],
    );
    git(w, &["push", "-q", "origin", "wip/h/20000101-000000"]);
    git(w, &["fetch", "-q", "origin"]);

    let ctx = OpContext::new(false);
    let latest = Git::new(&ctx, w).latest_remote_wip().expect("for-each-ref");
    assert_eq!(latest.as_deref(), Some("wip/h/20000101-000000"));
}

#[test]
fn latest_remote_wip_none_without_wip_refs() {
    let fx = fixture();
    let ctx = OpContext::new(false);
    assert_eq!(Git::new(&ctx, &fx.work).latest_remote_wip().expect("query"), None);
}

// ---------------------------------------------------------------------------
// Execution and interruption
// ---------------------------------------------------------------------------

#[test]
fn real_mutations_change_state() {
    let fx = fixture();
    make_dirty(&fx.work);
    let ctx = OpContext::new(false);
    let g = Git::new(&ctx, &fx.work);

    assert_eq!(g.switch_create("wip/h/1").expect("switch"), Effect::Applied);
    g.add_all().expect("add");
    g.commit_allow_empty("checkpoint").expect("commit");
    g.push_with_upstream("wip/h/1").expect("push");

    assert!(git(&fx.work, &["status", "--porcelain"]).is_empty());
    assert!(g.remote_has_branch("wip/h/1").expect("ls-remote"));
}

#[test]
fn failed_command_reports_args_and_stderr() {
    let fx = fixture();
    let ctx = OpContext::new(false);
    let err = Git::new(&ctx, &fx.work).switch("does-not-exist").unwrap_err();
    match err {
        GitError::Failed { args, stderr, .. } => {
            assert_eq!(args, "switch does-not-exist");
            assert!(!stderr.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn cancelled_context_runs_nothing() {
    let fx = fixture();
    let ctx = OpContext::new(false);
    ctx.cancel();
    let err = Git::new(&ctx, &fx.work).current_branch().unwrap_err();
    assert!(matches!(err, GitError::Cancelled { .. }), "got: {err}");
    assert!(err.is_interrupted());
}

#[test]
fn expired_deadline_runs_nothing() {
    let fx = fixture();
    make_dirty(&fx.work);
    let ctx = OpContext::new(false).with_timeout(std::time::Duration::ZERO);
    let err = Git::new(&ctx, &fx.work).add_all().unwrap_err();
    assert!(matches!(err, GitError::DeadlineExceeded { .. }), "got: {err}");
    assert!(!git(&fx.work, &["status", "--porcelain"]).starts_with('M'));
}

#[cfg(unix)]
#[test]
fn cancel_while_running_kills_the_command() {
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};

    let fx = fixture();
    let hook = fx.work.join(".git").join("hooks").join("pre-commit");
    fs::create_dir_all(hook.parent().expect("hooks dir")).expect("mkdir hooks");
    fs::write(&hook, "#!/bin/sh\nsleep 5\n").expect("write hook");
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).expect("chmod hook");

    let ctx = OpContext::new(false).unit();
    let canceller = ctx.clone();
    let timer = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        canceller.cancel();
    });

    let started = Instant::now();
    let err = Git::new(&ctx, &fx.work)
        .commit_allow_empty("slow")
        .unwrap_err();
    timer.join().expect("timer thread");

    assert!(matches!(err, GitError::Cancelled { .. }), "got: {err}");
    assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
    assert!(ctx.was_interrupted());
    assert_eq!(git(&fx.work, &["log", "-1", "--pretty=%s"]).trim(), "initial");
}

#[test]
fn completed_commands_leave_no_interruption_mark() {
    let fx = fixture();
    let ctx = OpContext::new(false).unit();
    Git::new(&ctx, &fx.work).current_branch().expect("branch");
    assert!(!ctx.was_interrupted());
}
