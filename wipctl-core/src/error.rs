//! Error types for wipctl-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while resolving workspace configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure with the offending path attached.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The settings file exists but is not valid YAML for [`crate::Settings`].
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The workspace root does not exist or is not a directory.
    #[error("workspace not found at {path}")]
    WorkspaceNotFound { path: PathBuf },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
