//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services. Core code
//! never reads environment variables itself; the `*_from_env_value` helpers take the raw values
//! so the binary decides where they come from.

use crate::constants::DEFAULT_HISTORY_SUFFIX;
use crate::{HistoryError, HistoryResult};

/// Name and email recorded on history commits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitIdentity {
    name: String,
    email: String,
}

impl CommitIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> HistoryResult<Self> {
        let name = name.into().trim().to_string();
        let email = email.into().trim().to_string();

        if name.is_empty() || email.is_empty() {
            return Err(HistoryError::InvalidInput(
                "commit author name and email cannot be empty".into(),
            ));
        }
        if name.contains(['\n', '\r', '<', '>']) || email.contains(['\n', '\r', '<', '>']) {
            return Err(HistoryError::InvalidInput(
                "commit author name and email must be single-line and contain no angle brackets"
                    .into(),
            ));
        }

        Ok(Self { name, email })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    history_suffix: String,
    author: Option<CommitIdentity>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `history_suffix` is appended to a notebook's absolute path to name its history directory,
    /// so it must be non-empty and must not contain a path separator.
    pub fn new(
        history_suffix: impl Into<String>,
        author: Option<CommitIdentity>,
    ) -> HistoryResult<Self> {
        let history_suffix = history_suffix.into();
        if history_suffix.trim().is_empty() {
            return Err(HistoryError::InvalidInput(
                "history suffix cannot be empty".into(),
            ));
        }
        if history_suffix.contains(['/', '\\', '\0']) {
            return Err(HistoryError::InvalidInput(
                "history suffix cannot contain path separators".into(),
            ));
        }

        Ok(Self {
            history_suffix,
            author,
        })
    }

    pub fn history_suffix(&self) -> &str {
        &self.history_suffix
    }

    /// Explicitly configured commit identity, if any. When `None`, the history repository's
    /// git configuration is used.
    pub fn author(&self) -> Option<&CommitIdentity> {
        self.author.as_ref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            history_suffix: DEFAULT_HISTORY_SUFFIX.into(),
            author: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the history suffix from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default suffix.
pub fn history_suffix_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_HISTORY_SUFFIX.into())
}

/// Build a commit identity from optional name and email values.
///
/// Both unset (or blank) means "no explicit identity". Setting only one of them is rejected.
pub fn commit_identity_from_env_values(
    name: Option<String>,
    email: Option<String>,
) -> HistoryResult<Option<CommitIdentity>> {
    match (non_blank(name), non_blank(email)) {
        (None, None) => Ok(None),
        (Some(name), Some(email)) => CommitIdentity::new(name, email).map(Some),
        _ => Err(HistoryError::InvalidInput(
            "NBHISTORY_AUTHOR_NAME and NBHISTORY_AUTHOR_EMAIL must be set together".into(),
        )),
    }
}
