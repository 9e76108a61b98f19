//! Constants used throughout the nbhistory core crate.
//!
//! This module contains path and filename constants so the on-disk history layout is defined
//! in one place.

/// Suffix appended to a tracked notebook path to form its history directory.
pub const DEFAULT_HISTORY_SUFFIX: &str = ".history";

/// Filename of the whole-notebook snapshot inside a history directory.
pub const SNAPSHOT_FILENAME: &str = "notebook";

/// Directory name of the repository metadata inside a history directory.
pub const GIT_DIR_NAME: &str = ".git";

/// Branch every history repository commits to.
pub const MAIN_REF: &str = "refs/heads/main";

/// Names a cell id may not take because they would overwrite history layout entries.
pub const RESERVED_ARTIFACT_NAMES: &[&str] = &[SNAPSHOT_FILENAME, GIT_DIR_NAME];

/// Commit identity used when neither configuration nor git config provides one.
pub const DEFAULT_AUTHOR_NAME: &str = "nbhistory";
pub const DEFAULT_AUTHOR_EMAIL: &str = "nbhistory@localhost";
