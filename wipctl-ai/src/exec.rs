//! `exec` provider: runs an external program per request.
//!
//! The program receives `{"command": "<kind>", "input": {...}}` on stdin and
//! answers on stdout. The answer is trimmed. The call is bounded by a timeout
//! after which the child is killed.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use serde::Serialize;
use wait_timeout::ChildExt;

use crate::error::GenerateError;
use crate::input::GenerationInput;
use crate::{GenerationKind, Generator};

#[derive(Serialize)]
struct Request<'a> {
    command: &'a str,
    input: &'a GenerationInput,
}

/// Generator backed by an external command line.
#[derive(Debug, Clone)]
pub struct ExecGenerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExecGenerator {
    /// `command_line` is split on whitespace: program followed by arguments.
    pub fn new(command_line: &str, timeout: Duration) -> Result<Self, GenerateError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(GenerateError::NotConfigured)?;
        Ok(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Generator for ExecGenerator {
    fn name(&self) -> &str {
        "exec"
    }

    fn generate(&self, kind: GenerationKind, input: &GenerationInput) -> Result<String, GenerateError> {
        let payload = serde_json::to_vec(&Request {
            command: kind.as_str(),
            input,
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GenerateError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            thread::spawn(move || {
                let _ = stdin.write_all(&payload);
            });
        }
        let stdout = child.stdout.take().map(|mut out| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = out.read_to_string(&mut buf);
                buf
            })
        });
        let stderr = child.stderr.take().map(|mut err| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GenerateError::Timeout {
                    program: self.program.clone(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        let stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
        if !status.success() {
            return Err(GenerateError::Failed {
                program: self.program.clone(),
                code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_command_line_is_not_configured() {
        let err = ExecGenerator::new("   ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, GenerateError::NotConfigured));
    }

    #[test]
    fn command_line_is_split_into_program_and_args() {
        let g = ExecGenerator::new("wip-writer --style short", Duration::from_secs(1)).unwrap();
        assert_eq!(g.program(), "wip-writer");
        assert_eq!(g.args, vec!["--style", "short"]);
    }
}
