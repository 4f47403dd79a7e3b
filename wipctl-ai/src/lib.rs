//! # wipctl-ai
//!
//! The generation collaborator: given structured context about repository
//! changes, return free text (commit message, synopsis, briefing).
//!
//! Callers go through [`suggest`], which turns every failure or empty answer
//! into `None`. A generator can therefore never fail the surrounding git
//! operation.

pub mod error;
pub mod exec;
pub mod input;

use std::fmt;
use std::time::Duration;

pub use error::GenerateError;
pub use exec::ExecGenerator;
pub use input::{
    CommitMsgInput, GenerationInput, RepoBriefingInput, WorkspaceContextInput, WorkspaceRepo,
};

/// Default bound on one generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What the caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationKind {
    CommitMessage,
    /// Short status synopsis across the workspace.
    Synopsis,
    /// Briefing for a single repository.
    RepoReview,
    /// Briefing for the whole workspace.
    WorkspaceBriefing,
}

impl GenerationKind {
    /// Wire name sent to external providers.
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::CommitMessage => "commit",
            GenerationKind::Synopsis => "synopsis",
            GenerationKind::RepoReview => "prreview",
            GenerationKind::WorkspaceBriefing => "workspace",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text generation capability.
pub trait Generator: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    fn generate(&self, kind: GenerationKind, input: &GenerationInput) -> Result<String, GenerateError>;
}

/// Provider that never has a suggestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneGenerator;

impl Generator for NoneGenerator {
    fn name(&self) -> &str {
        "none"
    }

    fn generate(&self, _kind: GenerationKind, _input: &GenerationInput) -> Result<String, GenerateError> {
        Err(GenerateError::NotConfigured)
    }
}

/// Choose the provider once at startup.
///
/// `none` (or nothing) gives [`NoneGenerator`]. `exec` needs a command line.
/// HTTP providers are not built in; selecting one logs a warning and falls
/// back to `none`.
pub fn from_settings(
    provider: Option<&str>,
    exec: Option<&str>,
    timeout: Option<Duration>,
) -> Box<dyn Generator> {
    let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
    match provider.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("none") => Box::new(NoneGenerator),
        Some("exec") => match exec.map(|cmd| ExecGenerator::new(cmd, timeout)) {
            Some(Ok(generator)) => {
                tracing::debug!(program = generator.program(), "exec generator ready");
                Box::new(generator)
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "exec generator unavailable; using none");
                Box::new(NoneGenerator)
            }
            None => {
                tracing::warn!("exec generator selected without a command; using none");
                Box::new(NoneGenerator)
            }
        },
        Some(other) => {
            tracing::warn!(provider = other, "unsupported generator provider; using none");
            Box::new(NoneGenerator)
        }
    }
}

/// Ask `generator` for text; any error or blank answer is `None`.
pub fn suggest(
    generator: &dyn Generator,
    kind: GenerationKind,
    input: &GenerationInput,
) -> Option<String> {
    match generator.generate(kind, input) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                tracing::debug!(provider = generator.name(), %kind, "empty suggestion");
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(GenerateError::NotConfigured) => None,
        Err(e) => {
            tracing::warn!(provider = generator.name(), %kind, error = %e, "generation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl Generator for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn generate(&self, _: GenerationKind, _: &GenerationInput) -> Result<String, GenerateError> {
            Ok(self.0.to_string())
        }
    }

    fn input() -> GenerationInput {
        GenerationInput::Commit(CommitMsgInput::default())
    }

    #[test]
    fn suggestion_is_trimmed() {
        let got = suggest(&Fixed("  feat: x \n"), GenerationKind::CommitMessage, &input());
        assert_eq!(got.as_deref(), Some("feat: x"));
    }

    #[test]
    fn blank_suggestion_is_none() {
        assert_eq!(suggest(&Fixed(" \n"), GenerationKind::Synopsis, &input()), None);
    }

    #[test]
    fn none_provider_never_suggests() {
        assert_eq!(suggest(&NoneGenerator, GenerationKind::CommitMessage, &input()), None);
    }

    #[test]
    fn unknown_provider_falls_back_to_none() {
        assert_eq!(from_settings(Some("openai"), None, None).name(), "none");
        assert_eq!(from_settings(Some("exec"), None, None).name(), "none");
        assert_eq!(from_settings(None, Some("/bin/echo"), None).name(), "none");
        assert_eq!(from_settings(Some("EXEC"), Some("/bin/echo"), None).name(), "exec");
    }
}
