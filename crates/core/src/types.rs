//! Validated value types used at the history boundary.

use crate::constants::RESERVED_ARTIFACT_NAMES;
use crate::{HistoryError, HistoryResult};
use std::fmt;

/// A commit message guaranteed to contain non-whitespace text.
///
/// The text is stored exactly as given; only the emptiness check ignores whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage(String);

impl CommitMessage {
    pub fn new(input: impl Into<String>) -> HistoryResult<Self> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(HistoryError::InvalidInput(
                "commit message cannot be empty".into(),
            ));
        }
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommitMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Code points that HFS+ ignores when comparing file names.
const HFS_IGNORABLE: &[char] = &[
    '\u{200c}', '\u{200d}', '\u{200e}', '\u{200f}', '\u{202a}', '\u{202b}', '\u{202c}',
    '\u{202d}', '\u{202e}', '\u{206a}', '\u{206b}', '\u{206c}', '\u{206d}', '\u{206e}',
    '\u{206f}', '\u{feff}',
];

/// The name a case-insensitive, NTFS or HFS+ filesystem would actually use for `id`.
///
/// Drops an NTFS stream suffix (`name:stream`), HFS+ ignorable code points, and trailing
/// dots and spaces, then lowercases ASCII.
fn filesystem_equivalent(id: &str) -> String {
    let name = id.split(':').next().unwrap_or(id);
    let name: String = name.chars().filter(|c| !HFS_IGNORABLE.contains(c)).collect();
    name.trim_end_matches(['.', ' ']).to_ascii_lowercase()
}

/// `git~1`, `git~2`, ...: NTFS 8.3 short names that can alias `.git`.
fn is_git_short_name(name: &str) -> bool {
    name.strip_prefix("git~")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// A cell id that is safe to use as a single file name inside a history directory.
///
/// Ids are taken verbatim (no trimming or case folding) because they name the artifact file.
/// Ids that only alias a reserved name on some filesystem (`.GIT`, `Notebook`, `.git `,
/// `git~1`) are rejected too, so that Git never refuses a path after artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
    pub fn new(id: &str) -> HistoryResult<Self> {
        let equivalent = filesystem_equivalent(id);
        let reason = if id.is_empty() {
            Some("id is empty")
        } else if id == "." || id == ".." {
            Some("id is a relative path component")
        } else if id.contains(['/', '\\', '\0']) {
            Some("id contains a path separator or NUL")
        } else if id.ends_with(['.', ' ']) {
            Some("id ends with a dot or space")
        } else if RESERVED_ARTIFACT_NAMES
            .iter()
            .any(|reserved| equivalent == *reserved)
            || is_git_short_name(&equivalent)
        {
            Some("id is reserved by the history layout")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(HistoryError::InvalidCellId {
                id: id.to_owned(),
                reason,
            }),
            None => Ok(Self(id.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
