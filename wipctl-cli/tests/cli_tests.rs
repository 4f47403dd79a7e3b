//! End-to-end tests of the `wipctl` binary against scratch workspaces.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("spawn git");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn configure(dir: &Path) {
    git(dir, &["config", "user.name", "wipctl test"]);
    git(dir, &["config", "user.email", "test@wipctl.invalid"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

struct Workspace {
    tmp: TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("ws");
        fs::create_dir_all(&root).expect("mkdir ws");
        Self { tmp, root }
    }

    /// `<ws>/<name>` on `main`, pushed to a bare origin outside the workspace.
    fn repo(&self, name: &str) -> PathBuf {
        let origin = self.tmp.path().join(format!("{name}.git"));
        let work = self.root.join(name);
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
        work
    }

    fn local_only(&self, name: &str) -> PathBuf {
        let work = self.root.join(name);
        fs::create_dir_all(&work).expect("mkdir work");
        git(&work, &["init", "-q"]);
        configure(&work);
        fs::write(work.join("a.txt"), "a\n").expect("write");
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-q", "-m", "initial"]);
        work
    }

    fn report_dir(&self) -> PathBuf {
        self.root.join(".wipctl")
    }

    fn reports(&self) -> Vec<String> {
        let Ok(items) = fs::read_dir(self.report_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = items
            .map(|i| i.expect("dir entry").file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with("wip-") && n.ends_with(".md"))
            .collect();
        names.sort();
        names
    }
}

/// `wipctl` with the workspace and host pinned and no generator configured.
fn wipctl(ws: &Workspace) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wipctl"));
    cmd.arg("--workspace")
        .arg(&ws.root)
        .args(["--host", "box"])
        .env_remove("WIPCTL_HOST")
        .env_remove("WIPCTL_AI_PROVIDER")
        .env_remove("WIPCTL_AI_EXEC")
        .env_remove("WIPCTL_AI_TIMEOUT")
        .env("NO_COLOR", "1")
        .env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

// ---------------------------------------------------------------------------
// Help and argument validation
// ---------------------------------------------------------------------------

#[test]
fn help_lists_every_subcommand() {
    let out = Command::new(assert_cmd::cargo::cargo_bin!("wipctl"))
        .arg("--help")
        .output()
        .expect("run");
    assert!(out.status.success());
    let help = String::from_utf8_lossy(&out.stdout);
    for sub in ["status", "push", "pull", "checkpoint", "review", "report"] {
        assert!(help.contains(sub), "{sub} missing from:\n{help}");
    }
}

#[test]
fn cross_repo_requires_feature() {
    let ws = Workspace::new();
    wipctl(&ws)
        .args(["checkpoint", "--cross-repo"])
        .assert()
        .failure()
        .stderr(contains("--feature"));
}

#[test]
fn missing_workspace_is_an_error() {
    let ws = Workspace::new();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wipctl"));
    cmd.arg("--workspace")
        .arg(ws.root.join("nope"))
        .arg("status")
        .assert()
        .failure()
        .stderr(contains("failed to load workspace"));
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[test]
fn status_prints_one_row_per_repository() {
    let ws = Workspace::new();
    ws.repo("api");
    ws.local_only("scratch");
    fs::write(ws.root.join("api").join("notes.txt"), "x\n").expect("write");

    wipctl(&ws)
        .arg("status")
        .assert()
        .success()
        .stdout(contains("2 repositories | 1 dirty"))
        .stdout(contains("api"))
        .stdout(contains("dirty"))
        .stdout(contains("scratch"))
        .stdout(contains("no-origin"));
}

#[test]
fn status_json_is_machine_readable() {
    let ws = Workspace::new();
    ws.repo("api");

    let out = wipctl(&ws).args(["status", "--json"]).output().expect("run");
    assert!(out.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(parsed["repositories"], 1);
    assert_eq!(parsed["statuses"][0]["name"], "api");
    assert_eq!(parsed["statuses"][0]["state"], "clean");
    assert_eq!(parsed["statuses"][0]["branch"], "main");
}

#[test]
fn status_ai_without_provider_says_no_synopsis() {
    let ws = Workspace::new();
    ws.repo("api");
    wipctl(&ws)
        .args(["status", "--ai"])
        .assert()
        .success()
        .stdout(contains("No synopsis available."));
}

// ---------------------------------------------------------------------------
// push / pull / checkpoint
// ---------------------------------------------------------------------------

#[test]
fn dry_run_push_changes_nothing_and_saves_a_report() {
    let ws = Workspace::new();
    let api = ws.repo("api");
    fs::write(api.join("README.md"), "hello\nchanged\n").expect("modify");
    let before = git(&api, &["status", "--porcelain"]);
    let head = git(&api, &["rev-parse", "HEAD"]);

    wipctl(&ws)
        .args(["--dry-run", "push", "--auto-add"])
        .assert()
        .success()
        .stdout(contains("[dry-run] "))
        .stdout(contains("api"))
        .stdout(contains("Report: "));

    assert_eq!(git(&api, &["status", "--porcelain"]), before);
    assert_eq!(git(&api, &["rev-parse", "HEAD"]), head);
    assert!(git(&api, &["ls-remote", "--heads", "origin", "wip/*"]).trim().is_empty());

    let reports = ws.reports();
    assert_eq!(reports.len(), 1, "{reports:?}");
    assert!(reports[0].starts_with("wip-push-"));
    let body = fs::read_to_string(ws.report_dir().join(&reports[0])).expect("read report");
    assert!(body.contains("# WIP Push Report"));
    assert!(body.contains("**Mode:** dry-run"));
}

#[test]
fn push_clean_repository_creates_wip_branch_on_origin() {
    let ws = Workspace::new();
    let api = ws.repo("api");

    wipctl(&ws)
        .arg("push")
        .assert()
        .success()
        .stdout(contains("wip/box/"))
        .stdout(contains("success"));

    let remote = git(&api, &["ls-remote", "--heads", "origin", "wip/box/*"]);
    assert_eq!(remote.lines().count(), 1, "{remote}");
    assert_eq!(git(&api, &["rev-parse", "--abbrev-ref", "HEAD"]).trim(), "main");
}

#[test]
fn push_prefix_names_the_branch() {
    let ws = Workspace::new();
    let api = ws.repo("api");

    wipctl(&ws)
        .args(["push", "--prefix", "wip/custom/handoff"])
        .assert()
        .success();

    let remote = git(&api, &["ls-remote", "--heads", "origin", "wip/custom/handoff"]);
    assert!(!remote.trim().is_empty());
}

#[test]
fn pull_without_wip_branches_reports_no_wip() {
    let ws = Workspace::new();
    ws.repo("api");

    wipctl(&ws)
        .arg("pull")
        .assert()
        .success()
        .stdout(contains("no-wip"))
        .stdout(contains("1 no-wip"));
}

#[test]
fn checkpoint_of_clean_workspace_is_not_needed() {
    let ws = Workspace::new();
    ws.repo("api");

    wipctl(&ws)
        .args(["checkpoint", "--feature", "auth"])
        .assert()
        .success()
        .stdout(contains("No checkpoint needed"));
    assert!(ws.reports().is_empty());
}

#[test]
fn checkpoint_pushes_dirty_repository_with_feature() {
    let ws = Workspace::new();
    let api = ws.repo("api");
    fs::write(api.join("login.rs"), "fn login() {}\n").expect("write");

    wipctl(&ws)
        .args(["checkpoint", "--feature", "auth", "--cross-repo", "--message", "EOD"])
        .assert()
        .success()
        .stdout(contains("1 of 1 repositories checkpointed"));

    let remote = git(&api, &["ls-remote", "--heads", "origin", "wip/box/auth/*"]);
    assert_eq!(remote.lines().count(), 1, "{remote}");
    assert!(git(&api, &["status", "--porcelain"]).trim().is_empty());

    let reports = ws.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("wip-checkpoint-"));
    let body = fs::read_to_string(ws.report_dir().join(&reports[0])).expect("read report");
    assert!(body.contains("**Feature:** auth"));
    assert!(body.contains("- **Message:** [EOD] checkpoint("), "{body}");
}

// ---------------------------------------------------------------------------
// review / report
// ---------------------------------------------------------------------------

#[test]
fn review_rejects_a_non_repository() {
    let ws = Workspace::new();
    let plain = ws.root.join("plain");
    fs::create_dir_all(&plain).expect("mkdir");

    wipctl(&ws)
        .arg("review")
        .arg(&plain)
        .assert()
        .failure()
        .stderr(contains("is not a git repository"));
}

#[test]
fn review_without_provider_prints_collected_context() {
    let ws = Workspace::new();
    let api = ws.repo("api");
    fs::write(api.join("README.md"), "hello\nchanged\n").expect("modify");

    wipctl(&ws)
        .arg("review")
        .arg(&api)
        .assert()
        .success()
        .stdout(contains("No briefing available"))
        .stdout(contains("README.md"))
        .stdout(contains("initial"));
}

#[test]
fn report_lists_and_shows_saved_reports() {
    let ws = Workspace::new();
    ws.repo("api");

    wipctl(&ws).arg("report").assert().success().stdout(contains("No reports"));
    wipctl(&ws).arg("pull").assert().success();

    let reports = ws.reports();
    assert_eq!(reports.len(), 1);

    wipctl(&ws)
        .arg("report")
        .assert()
        .success()
        .stdout(contains(reports[0].as_str()))
        .stdout(contains("pull"));

    wipctl(&ws)
        .args(["report", "--show", reports[0].as_str()])
        .assert()
        .success()
        .stdout(contains("# WIP Pull Report"))
        .stdout(contains("- **api**: no-wip"));
}
