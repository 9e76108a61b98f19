//! Save, load and revert for tracked notebooks.
//!
//! **save** parses the live notebook, writes one artifact per cell (named by cell id, holding
//! the cell's source lines concatenated verbatim) plus the re-rendered whole-notebook snapshot
//! into the history directory, and commits them.
//!
//! **load** copies the committed snapshot over the live notebook byte for byte. Per-cell
//! artifacts exist for external diffing and review; they are never used to rebuild a notebook.
//!
//! **revert** rolls the history back one commit, then loads.
//!
//! None of these are transactional. A failure part way through a save leaves already-written
//! artifacts on disk and uncommitted until the next successful save. Nothing here locks the
//! history directory, so concurrent saves of the same notebook from separate processes race.

use crate::backend::{short_commit_id, SnapshotInfo, VersionControl};
use crate::config::CoreConfig;
use crate::constants::SNAPSHOT_FILENAME;
use crate::git::GitBackend;
use crate::paths::HistoryPaths;
use crate::types::{ArtifactName, CommitMessage};
use crate::{HistoryError, HistoryResult};
use nbhistory_notebook::Notebook;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Check every cell id can name its own artifact, before anything is written.
fn artifact_names(notebook: &Notebook) -> HistoryResult<Vec<ArtifactName>> {
    let mut seen = HashSet::with_capacity(notebook.cells.len());
    let mut names = Vec::with_capacity(notebook.cells.len());

    for id in notebook.cell_ids() {
        let name = ArtifactName::new(id)?;
        if !seen.insert(name.clone()) {
            return Err(HistoryError::DuplicateCellId(id.to_owned()));
        }
        names.push(name);
    }

    Ok(names)
}

fn write_file(path: &Path, contents: &[u8]) -> HistoryResult<()> {
    fs::write(path, contents).map_err(|source| HistoryError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn read_file(path: &Path) -> HistoryResult<Vec<u8>> {
    fs::read(path).map_err(|source| HistoryError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Notebook history operations over a [`VersionControl`] backend.
pub struct NotebookHistory<B = GitBackend> {
    config: CoreConfig,
    backend: B,
}

impl NotebookHistory<GitBackend> {
    /// History backed by Git, committing as the configured author when one is set.
    pub fn new(config: CoreConfig) -> Self {
        let backend = GitBackend::new(config.author().cloned());
        Self { config, backend }
    }
}

impl<B: VersionControl> NotebookHistory<B> {
    pub fn with_backend(config: CoreConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn paths(&self, notebook_path: &Path) -> HistoryResult<HistoryPaths> {
        HistoryPaths::resolve(notebook_path, self.config.history_suffix())
    }

    /// Snapshot the notebook at `notebook_path` and commit it with `message`.
    ///
    /// The notebook is parsed and every cell id is validated before the history directory is
    /// touched, so a malformed notebook leaves both the live file and its history as they were.
    /// Cells are written in document order and the first failure stops the save.
    ///
    /// Returns the new commit id.
    pub fn save(&self, notebook_path: &Path, message: &CommitMessage) -> HistoryResult<String> {
        let paths = self.paths(notebook_path)?;

        let bytes = read_file(paths.notebook())?;
        let notebook = Notebook::parse(&bytes)?;
        let names = artifact_names(&notebook)?;
        let snapshot = notebook.to_pretty_json()?;

        let history_dir = paths.history_dir();
        fs::create_dir_all(history_dir).map_err(|source| HistoryError::HistoryDirCreation {
            path: history_dir.to_path_buf(),
            source,
        })?;
        self.backend.ensure_repository(history_dir)?;

        let mut staged: Vec<PathBuf> = Vec::with_capacity(names.len() + 1);
        for (cell, name) in notebook.cells.iter().zip(&names) {
            let artifact = paths.artifact(name);
            tracing::debug!("saving {} cell to {}", cell.kind(), artifact.display());
            write_file(&artifact, cell.source().concatenated().as_bytes())?;
            staged.push(PathBuf::from(name.as_str()));
        }

        let snapshot_path = paths.snapshot();
        tracing::debug!("saving snapshot to {}", snapshot_path.display());
        write_file(&snapshot_path, &snapshot)?;
        staged.push(PathBuf::from(SNAPSHOT_FILENAME));

        let commit = self
            .backend
            .stage_and_commit(history_dir, &staged, message)?;
        tracing::info!(
            "saved {} ({} cells) as {}",
            paths.notebook().display(),
            notebook.cells.len(),
            short_commit_id(&commit)
        );
        Ok(commit)
    }

    /// Overwrite the notebook at `notebook_path` with its last committed snapshot.
    pub fn load(&self, notebook_path: &Path) -> HistoryResult<()> {
        let paths = self.paths(notebook_path)?;
        let snapshot_path = paths.snapshot();

        tracing::info!("restoring from {}", snapshot_path.display());
        let snapshot = read_file(&snapshot_path)?;

        tracing::info!("restoring to {}", paths.notebook().display());
        write_file(paths.notebook(), &snapshot)
    }

    /// Discard the most recent snapshot, then load the one before it.
    ///
    /// The discarded commit is gone for good. When there is no earlier snapshot the backend
    /// error is returned and the live notebook is not touched.
    pub fn revert(&self, notebook_path: &Path) -> HistoryResult<()> {
        let paths = self.paths(notebook_path)?;
        self.backend.rollback_one_commit(paths.history_dir())?;
        self.load(notebook_path)
    }

    /// Saved snapshots of the notebook, newest first.
    pub fn history(&self, notebook_path: &Path) -> HistoryResult<Vec<SnapshotInfo>> {
        let paths = self.paths(notebook_path)?;
        self.backend.history(paths.history_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommitIdentity;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use tempfile::TempDir;

    const V1: &str = r##"{
  "metadata": {"hello": "world"},
  "nbformat": 4,
  "nbformat_minor": 1,
  "cells": [
    {"cell_id": "intro", "cell_type": "markdown", "metadata": {}, "source": ["# Title\n", "text"]},
    {"cell_id": "imports", "cell_type": "code", "metadata": {}, "execution_count": 1,
     "source": "import os", "outputs": [{"output_type": "stream", "text": "noise"}]}
  ]
}"##;

    const V2: &str = r##"{
  "metadata": {"hello": "world"},
  "nbformat": 4,
  "nbformat_minor": 1,
  "cells": [
    {"cell_id": "intro", "cell_type": "markdown", "metadata": {}, "source": ["# Title v2\n", "text"]},
    {"cell_id": "imports", "cell_type": "code", "metadata": {}, "execution_count": 2, "source": ["import os\n", "import sys"]},
    {"cell_id": "notes", "cell_type": "raw", "metadata": {}, "source": "raw notes"}
  ]
}"##;

    fn history() -> NotebookHistory {
        let identity = CommitIdentity::new("Test Author", "test@example.com").unwrap();
        NotebookHistory::new(CoreConfig::new(".history", Some(identity)).unwrap())
    }

    fn message(text: &str) -> CommitMessage {
        CommitMessage::new(text).unwrap()
    }

    fn notebook_file(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("analysis.ipynb");
        fs::write(&path, contents).unwrap();
        path
    }

    fn rendered(contents: &str) -> Vec<u8> {
        Notebook::parse(contents.as_bytes())
            .unwrap()
            .to_pretty_json()
            .unwrap()
    }

    #[test]
    fn save_writes_cell_artifacts_and_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(&dir, V1);
        let history = history();

        history.save(&path, &message("v1")).unwrap();

        let paths = history.paths(&path).unwrap();
        assert!(paths.git_dir().is_dir());
        assert_eq!(
            fs::read_to_string(paths.history_dir().join("intro")).unwrap(),
            "# Title\ntext"
        );
        assert_eq!(
            fs::read_to_string(paths.history_dir().join("imports")).unwrap(),
            "import os"
        );

        let snapshot = fs::read(paths.snapshot()).unwrap();
        assert_eq!(snapshot, rendered(V1));
        let snapshot: Value = serde_json::from_slice(&snapshot).unwrap();
        assert!(snapshot["cells"][1].get("outputs").is_none());
        assert_eq!(snapshot["cells"][0]["source"], json!(["# Title\n", "text"]));
        assert_eq!(snapshot["cells"][1]["source"], json!("import os"));

        assert_eq!(fs::read_to_string(&path).unwrap(), V1);
    }

    #[test]
    fn save_load_revert_scenario() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(&dir, V1);
        let history = history();

        history.save(&path, &message("v1")).unwrap();
        fs::write(&path, V2).unwrap();
        history.save(&path, &message("v2")).unwrap();

        let snapshots = history.history(&path).unwrap();
        let summaries: Vec<&str> = snapshots.iter().map(|s| s.summary.as_str()).collect();
        assert_eq!(summaries, ["v2", "v1"]);

        let paths = history.paths(&path).unwrap();
        assert_eq!(fs::read(paths.snapshot()).unwrap(), rendered(V2));

        fs::write(&path, "scribbled over").unwrap();
        history.load(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), rendered(V2));

        history.revert(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), rendered(V1));
        assert_eq!(history.history(&path).unwrap().len(), 1);
        assert!(!paths.history_dir().join("notes").exists());

        let err = history.revert(&path).unwrap_err();
        assert!(matches!(err, HistoryError::NoParentCommit { .. }));
        assert_eq!(fs::read(&path).unwrap(), rendered(V1));
    }

    #[test]
    fn parse_failure_leaves_everything_untouched() {
        let dir = TempDir::new().unwrap();
        let bad = r#"{"metadata": {}, "nbformat": 4, "nbformat_minor": 1,
            "cells": [{"cell_id": "x", "cell_type": "heading", "metadata": {}, "source": ""}]}"#;
        let path = notebook_file(&dir, bad);
        let history = history();

        let err = history.save(&path, &message("bad")).unwrap_err();
        assert!(matches!(err, HistoryError::Notebook(_)));
        assert!(!history.paths(&path).unwrap().history_dir().exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), bad);
    }

    #[test]
    fn duplicate_cell_ids_are_rejected_before_writing() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(
            &dir,
            r#"{"metadata": {}, "nbformat": 4, "nbformat_minor": 1, "cells": [
                {"cell_id": "same", "cell_type": "raw", "metadata": {}, "source": "a"},
                {"cell_id": "same", "cell_type": "raw", "metadata": {}, "source": "b"}
            ]}"#,
        );
        let history = history();

        match history.save(&path, &message("dup")).unwrap_err() {
            HistoryError::DuplicateCellId(id) => assert_eq!(id, "same"),
            other => panic!("expected DuplicateCellId, got {other:?}"),
        }
        assert!(!history.paths(&path).unwrap().history_dir().exists());
    }

    #[test]
    fn reserved_cell_ids_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(
            &dir,
            r#"{"metadata": {}, "nbformat": 4, "nbformat_minor": 1, "cells": [
                {"cell_id": "notebook", "cell_type": "raw", "metadata": {}, "source": "a"}
            ]}"#,
        );

        let err = history().save(&path, &message("reserved")).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidCellId { .. }));
    }

    #[test]
    fn ids_aliasing_reserved_names_are_rejected_before_writing() {
        for id in [".Git", ".GIT", ".git ", "git~1", "Notebook"] {
            let dir = TempDir::new().unwrap();
            let contents = json!({
                "metadata": {},
                "nbformat": 4,
                "nbformat_minor": 1,
                "cells": [
                    {"cell_id": "ok", "cell_type": "raw", "metadata": {}, "source": "a"},
                    {"cell_id": id, "cell_type": "raw", "metadata": {}, "source": "b"}
                ]
            });
            let path = notebook_file(&dir, &contents.to_string());
            let history = history();

            match history.save(&path, &message("alias")).unwrap_err() {
                HistoryError::InvalidCellId { id: reported, .. } => assert_eq!(reported, id),
                other => panic!("expected InvalidCellId for {id:?}, got {other:?}"),
            }
            assert!(!history.paths(&path).unwrap().history_dir().exists());
        }
    }

    #[test]
    fn load_without_history_reports_snapshot_path() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(&dir, V1);

        match history().load(&path).unwrap_err() {
            HistoryError::FileRead { path: missing, .. } => {
                assert!(missing.ends_with("analysis.ipynb.history/notebook"))
            }
            other => panic!("expected FileRead, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), V1);
    }

    #[test]
    fn save_of_missing_notebook_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = history()
            .save(&dir.path().join("absent.ipynb"), &message("v1"))
            .unwrap_err();
        assert!(matches!(err, HistoryError::FileRead { .. }));
    }

    #[test]
    fn custom_suffix_changes_history_location() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(&dir, V1);
        let identity = CommitIdentity::new("Test Author", "test@example.com").unwrap();
        let history = NotebookHistory::new(CoreConfig::new(".versions", Some(identity)).unwrap());

        history.save(&path, &message("v1")).unwrap();
        assert!(dir.path().join("analysis.ipynb.versions/notebook").is_file());
        assert!(!dir.path().join("analysis.ipynb.history").exists());
    }

    /// Records backend calls and optionally fails commits.
    #[derive(Default)]
    struct RecordingBackend {
        calls: RefCell<Vec<String>>,
        fail_commit: bool,
    }

    impl VersionControl for RecordingBackend {
        fn ensure_repository(&self, _dir: &Path) -> HistoryResult<()> {
            self.calls.borrow_mut().push("ensure".into());
            Ok(())
        }

        fn stage_and_commit(
            &self,
            _dir: &Path,
            files: &[PathBuf],
            message: &CommitMessage,
        ) -> HistoryResult<String> {
            let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
            self.calls
                .borrow_mut()
                .push(format!("commit {} [{}]", message, names.join(",")));
            if self.fail_commit {
                return Err(HistoryError::GitCommit(git2::Error::from_str("disk full")));
            }
            Ok("abc123".into())
        }

        fn rollback_one_commit(&self, dir: &Path) -> HistoryResult<String> {
            self.calls.borrow_mut().push("rollback".into());
            Err(HistoryError::NoParentCommit {
                path: dir.to_path_buf(),
                commit: "abc123".into(),
            })
        }

        fn history(&self, _dir: &Path) -> HistoryResult<Vec<SnapshotInfo>> {
            Ok(vec![])
        }
    }

    #[test]
    fn stages_cells_in_document_order_then_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(&dir, V2);
        let history = NotebookHistory::with_backend(CoreConfig::default(), RecordingBackend::default());

        let commit = history.save(&path, &message("v2")).unwrap();
        assert_eq!(commit, "abc123");
        assert_eq!(
            *history.backend().calls.borrow(),
            ["ensure", "commit v2 [intro,imports,notes,notebook]"]
        );
    }

    #[test]
    fn commit_failure_surfaces_and_leaves_artifacts() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(&dir, V1);
        let backend = RecordingBackend {
            fail_commit: true,
            ..Default::default()
        };
        let history = NotebookHistory::with_backend(CoreConfig::default(), backend);

        let err = history.save(&path, &message("v1")).unwrap_err();
        assert!(err.is_backend_error());

        let paths = history.paths(&path).unwrap();
        assert!(paths.history_dir().join("intro").is_file());
        assert!(paths.snapshot().is_file());
    }

    #[test]
    fn revert_failure_skips_load() {
        let dir = TempDir::new().unwrap();
        let path = notebook_file(&dir, V1);
        let history = NotebookHistory::with_backend(CoreConfig::default(), RecordingBackend::default());

        let paths = history.paths(&path).unwrap();
        fs::create_dir_all(paths.history_dir()).unwrap();
        fs::write(paths.snapshot(), "stale snapshot").unwrap();

        let err = history.revert(&path).unwrap_err();
        assert!(matches!(err, HistoryError::NoParentCommit { .. }));
        assert_eq!(*history.backend().calls.borrow(), ["rollback"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), V1);
    }
}
