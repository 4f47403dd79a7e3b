//! Error types for wipctl-ai.

use thiserror::Error;

/// Why a generation call produced no text.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No provider is configured.
    #[error("no generator configured")]
    NotConfigured,

    #[error("failed to start generator `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generator `{program}` exited with {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("generator `{program}` timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("generator I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("generator input encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
