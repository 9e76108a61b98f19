//! Cell source text and its dual on-disk representation.
//!
//! Notebook writers store a cell's source either as one string or as a list of line strings.
//! Both are legal and both must survive a round trip unchanged: a single string is never
//! promoted to a one-element list, and a list (even an empty or one-element list) is never
//! collapsed to a string.

use crate::{NotebookError, NotebookResult};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A cell's textual content, tagged with the representation it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// Stored as a single JSON string.
    Text(String),
    /// Stored as a JSON array of strings, in order.
    Lines(Vec<String>),
}

impl Source {
    /// Build a source from a line list plus a representation flag.
    ///
    /// A non-list source holds exactly one line. Any other line count cannot be written back as
    /// a single string and is rejected instead of being coerced.
    pub fn from_parts(lines: Vec<String>, is_list: bool) -> NotebookResult<Self> {
        if is_list {
            return Ok(Self::Lines(lines));
        }

        let mut lines = lines.into_iter();
        match (lines.next(), lines.next()) {
            (Some(line), None) => Ok(Self::Text(line)),
            _ => Err(NotebookError::Encode(
                "cannot encode non-list source with other than one line".into(),
            )),
        }
    }

    /// The stored lines, in order. A [`Source::Text`] has exactly one.
    pub fn lines(&self) -> &[String] {
        match self {
            Self::Text(text) => std::slice::from_ref(text),
            Self::Lines(lines) => lines,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::Lines(_))
    }

    /// All lines joined with no separator.
    ///
    /// Notebook line lists carry their own trailing newlines, so this reproduces the text as
    /// the author wrote it.
    pub fn concatenated(&self) -> String {
        self.lines().concat()
    }
}

impl Serialize for Source {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Lines(lines) => serializer.collect_seq(lines),
        }
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => Ok(Self::Text(text)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(line) => Ok(line),
                    other => Err(<D::Error as de::Error>::custom(format!(
                        "expected array of strings for source, found {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Lines),
            other => Err(de::Error::custom(format!(
                "expected string or array for source, found {other}"
            ))),
        }
    }
}
