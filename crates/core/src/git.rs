//! Git backend for notebook history.
//!
//! Each history directory is the work tree of its own local Git repository (`git2`/libgit2,
//! no subprocesses). Repositories standardise on `refs/heads/main`; `HEAD` is pointed at it
//! when the repository is created so the first commit lands there.
//!
//! History is linear: every commit has the current `HEAD` as its only parent, and rolling back
//! is a hard reset to the first parent.

use crate::backend::{short_commit_id, SnapshotInfo, VersionControl};
use crate::config::CommitIdentity;
use crate::constants::{DEFAULT_AUTHOR_EMAIL, DEFAULT_AUTHOR_NAME, GIT_DIR_NAME, MAIN_REF};
use crate::types::CommitMessage;
use crate::{HistoryError, HistoryResult};
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};

/// A repository handle bundled with its work tree.
struct GitRepository {
    repo: git2::Repository,
    workdir: PathBuf,
}

impl GitRepository {
    fn init(workdir: &Path) -> HistoryResult<Self> {
        let repo = git2::Repository::init(workdir).map_err(HistoryError::GitInit)?;
        let this = Self::from_repo(repo, HistoryError::GitInit)?;
        this.ensure_main_head()?;
        Ok(this)
    }

    /// Open the repository rooted exactly at `workdir`, without searching parent directories.
    fn open(workdir: &Path) -> HistoryResult<Self> {
        let repo = git2::Repository::open_ext(
            workdir,
            git2::RepositoryOpenFlags::NO_SEARCH,
            std::iter::empty::<&std::ffi::OsStr>(),
        )
        .map_err(HistoryError::GitOpen)?;
        Self::from_repo(repo, HistoryError::GitOpen)
    }

    /// Take the work tree from the repository itself, which may differ from the path the
    /// caller used (symlinks resolved, trailing separator added).
    fn from_repo(
        repo: git2::Repository,
        on_bare: fn(git2::Error) -> HistoryError,
    ) -> HistoryResult<Self> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| on_bare(git2::Error::from_str("repository has no working directory")))?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    /// For a new repository this leaves an unborn `main` branch until the first commit.
    fn ensure_main_head(&self) -> HistoryResult<()> {
        self.repo
            .set_head(MAIN_REF)
            .map_err(HistoryError::GitSetHead)
    }

    /// Add `relative_paths` to the index, persist it, and commit the resulting tree.
    ///
    /// Paths may be workdir-relative or absolute under the workdir. Paths containing `..` are
    /// rejected.
    fn commit_paths(
        &self,
        signature: &git2::Signature<'_>,
        message: &str,
        relative_paths: &[PathBuf],
    ) -> HistoryResult<git2::Oid> {
        let mut index = self.repo.index().map_err(HistoryError::GitIndex)?;

        for path in relative_paths {
            let rel = if path.is_absolute() {
                path.strip_prefix(&self.workdir)
                    .map_err(|_| {
                        HistoryError::InvalidInput(format!(
                            "{} is outside the history directory",
                            path.display()
                        ))
                    })?
                    .to_path_buf()
            } else {
                path.to_path_buf()
            };

            if rel.components().any(|c| matches!(c, Component::ParentDir)) {
                return Err(HistoryError::InvalidInput(
                    "path must not contain parent directory references (..)".into(),
                ));
            }

            index.add_path(&rel).map_err(HistoryError::GitAdd)?;
        }
        index.write().map_err(HistoryError::GitIndex)?;

        let tree_id = index.write_tree().map_err(HistoryError::GitWriteTree)?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(HistoryError::GitFindTree)?;

        let parents = self.resolve_head_parents()?;
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        self.repo
            .commit(Some("HEAD"), signature, signature, message, &tree, &parent_refs)
            .map_err(HistoryError::GitCommit)
    }

    /// `[HEAD]` when a commit exists, empty for an unborn branch.
    fn resolve_head_parents(&self) -> HistoryResult<Vec<git2::Commit<'_>>> {
        match self.head_commit()? {
            Some(commit) => Ok(vec![commit]),
            None => Ok(vec![]),
        }
    }

    fn head_commit(&self) -> HistoryResult<Option<git2::Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit().map_err(HistoryError::GitPeel)?;
                Ok(Some(commit))
            }
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(HistoryError::GitHead(e)),
        }
    }

    /// The repository's configured `user.name`/`user.email`, or the built-in default identity
    /// when git config has none.
    fn configured_signature(&self) -> HistoryResult<git2::Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                git2::Signature::now(DEFAULT_AUTHOR_NAME, DEFAULT_AUTHOR_EMAIL)
                    .map_err(HistoryError::GitSignature)
            }
            Err(e) => Err(HistoryError::GitSignature(e)),
        }
    }
}

fn snapshot_info(commit: &git2::Commit<'_>) -> SnapshotInfo {
    let time =
        DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or(DateTime::<Utc>::MIN_UTC);

    SnapshotInfo {
        id: commit.id().to_string(),
        summary: commit.summary().unwrap_or("").to_string(),
        author: commit.author().name().unwrap_or("unknown").to_string(),
        time,
    }
}

/// [`VersionControl`] backed by a local Git repository per history directory.
#[derive(Clone, Debug, Default)]
pub struct GitBackend {
    identity: Option<CommitIdentity>,
}

impl GitBackend {
    /// `identity` overrides the repository's git config for commit author and committer.
    pub fn new(identity: Option<CommitIdentity>) -> Self {
        Self { identity }
    }

    fn signature(&self, repo: &GitRepository) -> HistoryResult<git2::Signature<'static>> {
        match &self.identity {
            Some(identity) => git2::Signature::now(identity.name(), identity.email())
                .map_err(HistoryError::GitSignature),
            None => repo.configured_signature(),
        }
    }
}

impl VersionControl for GitBackend {
    fn ensure_repository(&self, dir: &Path) -> HistoryResult<()> {
        if dir.join(GIT_DIR_NAME).exists() {
            GitRepository::open(dir)?;
            return Ok(());
        }

        GitRepository::init(dir)?;
        tracing::info!("initialised history repository in {}", dir.display());
        Ok(())
    }

    fn stage_and_commit(
        &self,
        dir: &Path,
        files: &[PathBuf],
        message: &CommitMessage,
    ) -> HistoryResult<String> {
        let repo = GitRepository::open(dir)?;
        let signature = self.signature(&repo)?;
        let oid = repo.commit_paths(&signature, message.as_str(), files)?;
        Ok(oid.to_string())
    }

    fn rollback_one_commit(&self, dir: &Path) -> HistoryResult<String> {
        let repo = GitRepository::open(dir)?;

        let head = repo.repo.head().map_err(HistoryError::GitHead)?;
        let commit = head.peel_to_commit().map_err(HistoryError::GitPeel)?;

        if commit.parent_count() == 0 {
            return Err(HistoryError::NoParentCommit {
                path: dir.to_path_buf(),
                commit: commit.id().to_string(),
            });
        }
        let parent = commit.parent(0).map_err(HistoryError::GitPeel)?;

        repo.repo
            .reset(parent.as_object(), git2::ResetType::Hard, None)
            .map_err(HistoryError::GitReset)?;

        let (discarded, current) = (commit.id().to_string(), parent.id().to_string());
        tracing::info!(
            "rolled back {} to {} in {}",
            short_commit_id(&discarded),
            short_commit_id(&current),
            dir.display()
        );
        Ok(current)
    }

    fn history(&self, dir: &Path) -> HistoryResult<Vec<SnapshotInfo>> {
        let repo = GitRepository::open(dir)?;
        if repo.head_commit()?.is_none() {
            return Ok(vec![]);
        }

        let mut walk = repo.repo.revwalk().map_err(HistoryError::GitRevwalk)?;
        walk.push_head().map_err(HistoryError::GitRevwalk)?;
        walk.simplify_first_parent()
            .map_err(HistoryError::GitRevwalk)?;

        let mut snapshots = Vec::new();
        for oid in walk {
            let oid = oid.map_err(HistoryError::GitRevwalk)?;
            let commit = repo.repo.find_commit(oid).map_err(HistoryError::GitPeel)?;
            snapshots.push(snapshot_info(&commit));
        }
        Ok(snapshots)
    }
}
