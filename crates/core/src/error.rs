use nbhistory_notebook::NotebookError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Notebook(#[from] NotebookError),
    #[error("cell id {id:?} cannot be used as an artifact name: {reason}")]
    InvalidCellId { id: String, reason: &'static str },
    #[error("cell id {0:?} is used by more than one cell")]
    DuplicateCellId(String),

    #[error("failed to resolve path {path}: {source}", path = path.display())]
    PathResolve {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create history directory {path}: {source}", path = path.display())]
    HistoryDirCreation {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}", path = path.display())]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to initialise git repository: {0}")]
    GitInit(git2::Error),
    #[error("failed to open git repository: {0}")]
    GitOpen(git2::Error),
    #[error("failed to access git index: {0}")]
    GitIndex(git2::Error),
    #[error("failed to add file to git index: {0}")]
    GitAdd(git2::Error),
    #[error("failed to write git tree: {0}")]
    GitWriteTree(git2::Error),
    #[error("failed to find git tree: {0}")]
    GitFindTree(git2::Error),
    #[error("failed to create git signature: {0}")]
    GitSignature(git2::Error),
    #[error("failed to create git commit: {0}")]
    GitCommit(git2::Error),
    #[error("failed to get git head: {0}")]
    GitHead(git2::Error),
    #[error("failed to set git head: {0}")]
    GitSetHead(git2::Error),
    #[error("failed to peel git commit: {0}")]
    GitPeel(git2::Error),
    #[error("failed to reset git repository: {0}")]
    GitReset(git2::Error),
    #[error("failed to walk git history: {0}")]
    GitRevwalk(git2::Error),
    #[error(
        "commit {commit} in {path} has no parent; there is no earlier snapshot to revert to",
        path = path.display()
    )]
    NoParentCommit { path: PathBuf, commit: String },
}

impl HistoryError {
    /// True for failures raised by the version-control backend.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            Self::GitInit(_)
                | Self::GitOpen(_)
                | Self::GitIndex(_)
                | Self::GitAdd(_)
                | Self::GitWriteTree(_)
                | Self::GitFindTree(_)
                | Self::GitSignature(_)
                | Self::GitCommit(_)
                | Self::GitHead(_)
                | Self::GitSetHead(_)
                | Self::GitPeel(_)
                | Self::GitReset(_)
                | Self::GitRevwalk(_)
                | Self::NoParentCommit { .. }
        )
    }
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;
