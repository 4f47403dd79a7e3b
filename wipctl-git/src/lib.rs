//! # wipctl-git
//!
//! Runs the `git` binary for one repository at a time.
//!
//! - [`OpContext`] carries the dry-run flag, deadline and cancellation.
//! - [`Git`] exposes the verbs used by the push/pull/checkpoint machines.
//! - [`JunkGuard`] refuses to stage build and cache artifacts.
//! - [`status::snapshot`] collects a [`wipctl_core::RepositoryStatus`].

pub mod context;
pub mod error;
pub mod executor;
pub mod junk;
pub mod parse;
mod runner;
pub mod status;

pub use context::OpContext;
pub use error::GitError;
pub use executor::{Effect, Git, Mutation, Preconditions};
pub use junk::JunkGuard;
pub use runner::GitOutput;
