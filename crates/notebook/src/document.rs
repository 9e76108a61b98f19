//! Whole-notebook parse and render.

use crate::{Cell, JsonMap, NotebookError, NotebookResult};
use serde::{Deserialize, Serialize};

/// A parsed notebook document.
///
/// Cell order is significant and is preserved through parse and render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub metadata: JsonMap,
    #[serde(rename = "nbformat")]
    pub format_version: u32,
    #[serde(rename = "nbformat_minor")]
    pub format_minor_version: u32,
    pub cells: Vec<Cell>,
}

impl Notebook {
    /// Parse notebook JSON.
    ///
    /// This uses `serde_path_to_error` so that a schema mismatch reports where it happened
    /// (for example `cells[3]` for a cell with an unknown `cell_type`).
    ///
    /// # Errors
    ///
    /// Returns [`NotebookError::Parse`] if the bytes are not JSON, if any required field is
    /// missing or has the wrong type, if a cell kind is unknown, or if a `source` is neither a
    /// string nor a list of strings.
    pub fn parse(bytes: &[u8]) -> NotebookResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);

        let notebook = match serde_path_to_error::deserialize::<_, Notebook>(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                return Err(NotebookError::Parse {
                    path: if path.is_empty() || path == "." {
                        "<root>".into()
                    } else {
                        path
                    },
                    message: source.to_string(),
                });
            }
        };

        deserializer.end().map_err(|e| NotebookError::Parse {
            path: "<root>".into(),
            message: e.to_string(),
        })?;

        Ok(notebook)
    }

    /// Render as pretty-printed JSON with two-space indentation and a trailing newline.
    ///
    /// The layout is stable so that successive snapshots diff cleanly.
    pub fn to_pretty_json(&self) -> NotebookResult<Vec<u8>> {
        let mut out =
            serde_json::to_vec_pretty(self).map_err(|e| NotebookError::Encode(e.to_string()))?;
        out.push(b'\n');
        Ok(out)
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(Cell::id)
    }
}
