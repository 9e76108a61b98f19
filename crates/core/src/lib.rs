//! # nbhistory core
//!
//! Versioning for notebooks: snapshots a notebook into a sibling history directory under Git,
//! and restores it from the latest snapshot.
//!
//! This crate contains the save/load/revert protocol and the history layout:
//! - one artifact per cell, named by cell id, for reviewing changes cell by cell
//! - a whole-notebook snapshot that is the only source for restores
//! - a [`VersionControl`] backend interface with a `git2` implementation
//!
//! **No CLI concerns**: argument parsing, environment lookup and log setup belong in the
//! `nbhistory` binary. The notebook document model lives in `nbhistory-notebook`.

pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod git;
pub mod history;
pub mod paths;
pub mod types;

pub use backend::{SnapshotInfo, VersionControl};
pub use config::{CommitIdentity, CoreConfig};
pub use error::{HistoryError, HistoryResult};
pub use git::GitBackend;
pub use history::NotebookHistory;
pub use paths::HistoryPaths;
pub use types::{ArtifactName, CommitMessage};

pub use nbhistory_notebook as notebook;
