//! # wipctl-sync
//!
//! The workspace synchronization engine.
//!
//! - [`coordinator`] runs one [`RepoHandler`] per repository under a
//!   concurrency limit and collects a [`wipctl_core::Report`].
//! - [`push`], [`pull`] and [`checkpoint`] are the per-repository machines.
//! - [`collector`] gathers status snapshots concurrently.
//! - [`writer`] stores rendered reports and lists them.
//! - [`pipeline`] ties discovery and the coordinator together for the CLI.

pub mod briefing;
pub mod checkpoint;
pub mod collector;
pub mod coordinator;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod prompt;
pub mod pull;
pub mod push;
mod steps;
pub mod writer;

pub use checkpoint::{CheckpointHandler, CheckpointOptions};
pub use coordinator::{Observer, RepoHandler};
pub use error::SyncError;
pub use prompt::{FixedAnswer, Prompter, StdinPrompter};
pub use pull::PullHandler;
pub use push::{PushHandler, PushOptions};
pub use writer::{list_reports_at, read_report_at, save_report_at, ReportFile};
