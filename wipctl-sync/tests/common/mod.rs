//! Shared fixtures: working copies with a bare `origin`, each under one
//! `TempDir`, with a local identity so the host git config does not leak in.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;
use wipctl_ai::{GenerateError, GenerationInput, GenerationKind, Generator, NoneGenerator};

pub fn git_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
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

pub fn git(dir: &Path, args: &[&str]) -> String {
    git_env(dir, args, &[])
}

pub fn porcelain(dir: &Path) -> String {
    git(dir, &["status", "--porcelain"])
}

pub fn current_branch(dir: &Path) -> String {
    git(dir, &["rev-parse", "--abbrev-ref", "HEAD"]).trim().to_string()
}

pub fn origin_has(dir: &Path, branch: &str) -> bool {
    !git(dir, &["ls-remote", "--heads", "origin", branch]).trim().is_empty()
}

/// A workspace directory plus a place for bare origins outside it.
pub struct Workspace {
    pub tmp: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("ws");
        fs::create_dir_all(&root).expect("mkdir ws");
        fs::create_dir_all(tmp.path().join("origins")).expect("mkdir origins");
        Self { tmp, root }
    }

    /// `<ws>/<name>` on `main` with one commit pushed to a bare origin.
    pub fn repo(&self, name: &str) -> PathBuf {
        let origin = self.tmp.path().join("origins").join(format!("{name}.git"));
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

    /// `<ws>/<name>` with a commit but no remote.
    pub fn local_only(&self, name: &str) -> PathBuf {
        let work = self.root.join(name);
        fs::create_dir_all(&work).expect("mkdir work");
        git(&work, &["init", "-q"]);
        configure(&work);
        fs::write(work.join("a.txt"), "a\n").expect("write");
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-q", "-m", "initial"]);
        work
    }
}

pub fn configure(dir: &Path) {
    git(dir, &["config", "user.name", "wipctl test"]);
    git(dir, &["config", "user.email", "test@wipctl.invalid"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// One modified tracked file and one new untracked file.
pub fn make_dirty(work: &Path) {
    fs::write(work.join("README.md"), "hello\nchanged\n").expect("modify");
    fs::write(work.join("notes.txt"), "untracked\n").expect("untracked");
}

pub fn none_generator() -> Arc<dyn Generator> {
    Arc::new(NoneGenerator)
}

/// Generator with a canned answer.
pub struct Canned(pub &'static str);

impl Generator for Canned {
    fn name(&self) -> &str {
        "canned"
    }

    fn generate(&self, _: GenerationKind, _: &GenerationInput) -> Result<String, GenerateError> {
        Ok(self.0.to_string())
    }
}
