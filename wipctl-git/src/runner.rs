//! Blocking `git` subprocess runner.
//!
//! Output is fully buffered. Reader threads drain stdout/stderr while the
//! child runs so large outputs cannot fill the pipe. The child is polled
//! with `wait_timeout` so cancellation and the deadline are checked at least
//! every [`POLL_INTERVAL`]; when either fires the child is killed.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::context::OpContext;
use crate::error::{io_err, GitError};

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured output of a successful run.
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `git <args>` inside `dir`, honouring cancellation and the deadline.
pub(crate) fn run_git(ctx: &OpContext, dir: &Path, args: &[String]) -> Result<GitOutput, GitError> {
    let joined = args.join(" ");
    check_interrupt(ctx, &joined)?;

    tracing::trace!(repo = %dir.display(), "git {joined}");
    let mut child = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| GitError::Spawn {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    // Readers stay detached on interruption; a grandchild may still hold the pipes.
    let status = wait_interruptible(ctx, &mut child, dir, &joined)?;

    let out = GitOutput {
        stdout: join(stdout),
        stderr: join(stderr),
    };
    if !status.success() {
        return Err(GitError::Failed {
            args: joined,
            code: status.code(),
            stderr: out.stderr.trim().to_string(),
        });
    }
    Ok(out)
}

fn check_interrupt(ctx: &OpContext, args: &str) -> Result<(), GitError> {
    let err = if ctx.is_cancelled() {
        GitError::Cancelled { args: args.to_string() }
    } else if ctx.deadline_passed() {
        GitError::DeadlineExceeded { args: args.to_string() }
    } else {
        return Ok(());
    };
    ctx.mark_interrupted();
    Err(err)
}

fn wait_interruptible(
    ctx: &OpContext,
    child: &mut Child,
    dir: &Path,
    args: &str,
) -> Result<ExitStatus, GitError> {
    loop {
        if let Some(status) = child.wait_timeout(POLL_INTERVAL).map_err(|e| io_err(dir, e))? {
            return Ok(status);
        }
        if let Err(e) = check_interrupt(ctx, args) {
            tracing::debug!(repo = %dir.display(), "killing git {args}: {e}");
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
