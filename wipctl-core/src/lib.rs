//! wipctl core library: domain types, report model, configuration, errors.
//!
//! Public API surface:
//! - [`types`]: repositories, status snapshots, WIP branch identifiers
//! - [`report`]: per-repository outcomes and the run report
//! - [`config`]: explicit workspace configuration and the settings file
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use config::{GeneratorSettings, Settings, WorkspaceConfig};
pub use error::ConfigError;
pub use report::{
    CheckpointTelemetry, EntryBuilder, Operation, Outcome, Report, ReportEntry, WorkspaceSummary,
};
pub use types::{RepoName, RepoState, Repository, RepositoryStatus, WipBranch};
