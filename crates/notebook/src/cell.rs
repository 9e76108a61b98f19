//! Notebook cells.
//!
//! A cell record is decoded in two steps: the `cell_type` discriminator is read first, then
//! the whole record is decoded against the schema for that kind. Encoding writes
//! `cell_type` followed by the variant's fields.
//!
//! Code cells never carry execution outputs. An `outputs` field on input is accepted and
//! discarded; notebooks are always restored without outputs.

use crate::{JsonMap, Source};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminator values for the `cell_type` field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Raw,
    Markdown,
    Code,
}

impl CellKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Markdown => "markdown",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "markdown" => Ok(Self::Markdown),
            "code" => Ok(Self::Code),
            other => Err(format!("unexpected cell kind {other:?}")),
        }
    }
}

/// Fields shared by every cell kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellBase {
    #[serde(rename = "cell_id")]
    pub id: String,
    #[serde(default)]
    pub metadata: JsonMap,
    pub source: Source,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCell {
    #[serde(flatten)]
    pub base: CellBase,
    /// Present only when the input had it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<JsonMap>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkdownCell {
    #[serde(flatten)]
    pub base: CellBase,
    /// Present only when the input had it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<JsonMap>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    #[serde(flatten)]
    pub base: CellBase,
    /// Always written; `null` when the cell has not been executed.
    #[serde(default)]
    pub execution_count: Option<i64>,
}

/// One notebook cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Raw(RawCell),
    Markdown(MarkdownCell),
    Code(CodeCell),
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Self::Raw(_) => CellKind::Raw,
            Self::Markdown(_) => CellKind::Markdown,
            Self::Code(_) => CellKind::Code,
        }
    }

    pub fn base(&self) -> &CellBase {
        match self {
            Self::Raw(cell) => &cell.base,
            Self::Markdown(cell) => &cell.base,
            Self::Code(cell) => &cell.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn source(&self) -> &Source {
        &self.base().source
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = JsonMap::deserialize(deserializer)?;

        let kind = match record.get("cell_type") {
            Some(serde_json::Value::String(kind)) => {
                kind.parse::<CellKind>().map_err(<D::Error as de::Error>::custom)?
            }
            Some(other) => return Err(de::Error::custom(format!("unexpected cell kind {other}"))),
            None => return Err(de::Error::missing_field("cell_type")),
        };

        let record = serde_json::Value::Object(record);
        let cell = match kind {
            CellKind::Raw => serde_json::from_value(record).map(Cell::Raw),
            CellKind::Markdown => serde_json::from_value(record).map(Cell::Markdown),
            CellKind::Code => serde_json::from_value(record).map(Cell::Code),
        };

        cell.map_err(|e| de::Error::custom(format!("{kind} cell: {e}")))
    }
}
