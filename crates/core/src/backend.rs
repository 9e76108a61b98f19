//! Version-control backend interface.
//!
//! The history protocol only needs to create a repository, commit a set of files, roll back one
//! commit, and list commits. Keeping those behind [`VersionControl`] means the document model
//! and protocol never see backend command syntax; [`crate::git::GitBackend`] is the production
//! implementation.

use crate::types::CommitMessage;
use crate::HistoryResult;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// One committed snapshot, as listed by [`VersionControl::history`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub id: String,
    pub summary: String,
    pub author: String,
    pub time: DateTime<Utc>,
}

/// The abbreviated form of a commit id shown in logs and listings.
pub fn short_commit_id(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}

impl SnapshotInfo {
    pub fn short_id(&self) -> &str {
        short_commit_id(&self.id)
    }
}

pub trait VersionControl {
    /// Make sure `dir` holds a repository, creating one if it does not. `dir` itself must
    /// already exist.
    fn ensure_repository(&self, dir: &Path) -> HistoryResult<()>;

    /// Stage `files` (relative to `dir`) and commit them with `message`. Returns the new commit
    /// id.
    fn stage_and_commit(
        &self,
        dir: &Path,
        files: &[PathBuf],
        message: &CommitMessage,
    ) -> HistoryResult<String>;

    /// Discard the most recent commit, resetting the working files to its parent. Returns the
    /// id of the commit that is now current.
    fn rollback_one_commit(&self, dir: &Path) -> HistoryResult<String>;

    /// Commits reachable from the current head, newest first.
    fn history(&self, dir: &Path) -> HistoryResult<Vec<SnapshotInfo>>;
}
