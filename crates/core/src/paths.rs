//! On-disk layout of a tracked notebook's history.
//!
//! For a notebook at absolute path `P` (with the default suffix):
//!
//! ```text
//! P.history/            history directory and git work tree
//! P.history/.git/       repository metadata
//! P.history/<cell-id>   one file per cell, raw concatenated source
//! P.history/notebook    whole-notebook snapshot
//! ```

use crate::constants::{GIT_DIR_NAME, SNAPSHOT_FILENAME};
use crate::types::ArtifactName;
use crate::{HistoryError, HistoryResult};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryPaths {
    notebook: PathBuf,
    history_dir: PathBuf,
}

impl HistoryPaths {
    /// Resolve the layout for `notebook_path`, made absolute against the current directory.
    ///
    /// Symlinks are not resolved, so a notebook reached through a link keeps its history next
    /// to the link.
    pub fn resolve(notebook_path: &Path, history_suffix: &str) -> HistoryResult<Self> {
        let notebook =
            std::path::absolute(notebook_path).map_err(|source| HistoryError::PathResolve {
                path: notebook_path.to_path_buf(),
                source,
            })?;

        let mut history_dir = notebook.clone().into_os_string();
        history_dir.push(history_suffix);

        Ok(Self {
            notebook,
            history_dir: PathBuf::from(history_dir),
        })
    }

    /// The live notebook file.
    pub fn notebook(&self) -> &Path {
        &self.notebook
    }

    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    pub fn git_dir(&self) -> PathBuf {
        self.history_dir.join(GIT_DIR_NAME)
    }

    pub fn snapshot(&self) -> PathBuf {
        self.history_dir.join(SNAPSHOT_FILENAME)
    }

    pub fn artifact(&self, name: &ArtifactName) -> PathBuf {
        self.history_dir.join(name.as_str())
    }
}
